//! Interrupt line input through the sysfs GPIO interface
//!
//! The pin is exported and switched to input once; its `value` file stays
//! open and is re-read from offset 0 on every sample.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use touchit_hal::{InputPin, Level};

use crate::error::SetupError;

/// Default sysfs GPIO root
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// `value` holds a short ASCII numeral plus newline
const VALUE_BUF_SIZE: usize = 4;

/// A sysfs GPIO configured as input
#[derive(Debug)]
pub struct SysfsPin {
    pin: u32,
    value: File,
}

impl SysfsPin {
    /// Export `pin` under `root`, make it an input and open its value file
    ///
    /// Exporting is skipped when the pin directory already exists.
    pub fn input(root: impl AsRef<Path>, pin: u32) -> Result<Self, SetupError> {
        let root = root.as_ref();
        let pin_dir = pin_dir(root, pin);

        if pin_dir.is_dir() {
            debug!("gpio{pin} already exported");
        } else {
            export(root, pin).map_err(|source| SetupError::Export { pin, source })?;
            debug!("Exported gpio{pin}");
        }

        fs::write(pin_dir.join("direction"), b"in")
            .map_err(|source| SetupError::Direction { pin, source })?;

        let value = File::open(pin_dir.join("value"))
            .map_err(|source| SetupError::OpenValue { pin, source })?;

        Ok(Self { pin, value })
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }

    /// Read the value file once and rewind it for the next sample
    pub fn sample(&mut self) -> io::Result<Option<Level>> {
        let mut buf = [0u8; VALUE_BUF_SIZE];
        let read = self.value.read(&mut buf);
        // Rewind even after a failed read so the next sample starts clean
        self.value.seek(SeekFrom::Start(0))?;
        Ok(parse_level(&buf[..read?]))
    }
}

impl InputPin for SysfsPin {
    fn level(&mut self) -> Option<Level> {
        match self.sample() {
            Ok(level) => level,
            Err(err) => {
                warn!("Failed to read gpio{} value: {err}", self.pin);
                None
            }
        }
    }
}

/// Parse the contents of a sysfs `value` file
///
/// `0` is low, any other number is high; empty or non-numeric content is
/// neither.
pub fn parse_level(raw: &[u8]) -> Option<Level> {
    let text = std::str::from_utf8(raw).ok()?.trim();
    let value: u32 = text.parse().ok()?;
    Some(if value == 0 { Level::Low } else { Level::High })
}

fn pin_dir(root: &Path, pin: u32) -> PathBuf {
    root.join(format!("gpio{pin}"))
}

fn export(root: &Path, pin: u32) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).open(root.join("export"))?;
    file.write_all(pin.to_string().as_bytes())
}
