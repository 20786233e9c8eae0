//! I2C bus access through the Linux i2c-dev interface
//!
//! The character device is opened once; the slave address is selected with
//! the `I2C_SLAVE` ioctl and re-selected only when a transfer targets a
//! different address (after the sensor has been moved with `SetAddress`).

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::path::Path;

use log::{debug, trace};
use touchit_hal::I2cBus;

use crate::error::{SetupError, TransportError};

/// `I2C_SLAVE` request from `<linux/i2c-dev.h>`
const I2C_SLAVE: u16 = 0x0703;

/// An open i2c-dev bus
#[derive(Debug)]
pub struct LinuxI2c {
    file: File,
    /// Slave address currently selected on the descriptor
    bound: Option<u8>,
}

impl LinuxI2c {
    /// Open the bus device for read/write
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| SetupError::OpenBus {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Opened i2c bus {}", path.display());
        Ok(Self { file, bound: None })
    }

    /// Open the bus and select `address` in one step
    pub fn open_bound(path: impl AsRef<Path>, address: u8) -> Result<Self, SetupError> {
        let mut bus = Self::open(path)?;
        bus.bind(address)
            .map_err(|source| SetupError::Bind { address, source })?;
        Ok(bus)
    }

    /// Slave address currently selected, if any
    pub fn bound_address(&self) -> Option<u8> {
        self.bound
    }

    /// Select the slave address for subsequent transfers
    pub fn bind(&mut self, address: u8) -> io::Result<()> {
        if self.bound == Some(address) {
            return Ok(());
        }

        // SAFETY: I2C_SLAVE takes the address by value and touches no memory
        // owned by this process; the descriptor is valid for the life of `file`.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(address),
            )
        };
        if rc < 0 {
            self.bound = None;
            return Err(io::Error::last_os_error());
        }

        debug!("Bound i2c slave {address:#04x}");
        self.bound = Some(address);
        Ok(())
    }

    fn select(&mut self, address: u8) -> Result<(), TransportError> {
        self.bind(address)
            .map_err(|source| TransportError::Bind { address, source })
    }

    #[cfg(test)]
    pub(crate) fn from_file(file: File, address: u8) -> Self {
        Self {
            file,
            bound: Some(address),
        }
    }
}

impl I2cBus for LinuxI2c {
    type Error = TransportError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.select(address)?;
        let written = self.file.write(data)?;
        trace!("i2c {address:#04x} TX {data:02x?}");
        if written != data.len() {
            return Err(TransportError::ShortWrite {
                expected: data.len(),
                written,
            });
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.select(address)?;
        let read = self.file.read(buf)?;
        trace!("i2c {address:#04x} RX {:02x?}", &buf[..read]);
        if read != buf.len() {
            return Err(TransportError::ShortRead {
                expected: buf.len(),
                read,
            });
        }
        Ok(())
    }
}
