//! Transport session: the sensor's bus and interrupt line opened together
//!
//! A session is opened once at startup and owns both descriptors until it
//! is closed or dropped. Any setup step failing aborts the open; nothing is
//! left half-initialised.

use std::path::PathBuf;

use log::{debug, info};
use touchit_hal::{I2cBus, InputPin, Level};

use crate::error::{SetupError, TransportError};
use crate::gpio::{SysfsPin, SYSFS_GPIO_ROOT};
use crate::i2c::LinuxI2c;

/// Where to find the sensor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// i2c-dev character device
    pub bus_path: PathBuf,
    /// 7-bit sensor address
    pub address: u8,
    /// GPIO number of the interrupt line
    pub notify_pin: u32,
    /// sysfs GPIO root
    pub gpio_root: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bus_path: PathBuf::from("/dev/i2c-1"),
            address: 0x70,
            notify_pin: 17,
            gpio_root: PathBuf::from(SYSFS_GPIO_ROOT),
        }
    }
}

/// Open bus and interrupt line for one sensor
#[derive(Debug)]
pub struct Session {
    bus: Option<LinuxI2c>,
    notify: Option<SysfsPin>,
    address: u8,
}

impl Session {
    /// Open the bus, bind the sensor address and set up the interrupt line
    pub fn open(config: &SessionConfig) -> Result<Self, SetupError> {
        let bus = LinuxI2c::open_bound(&config.bus_path, config.address)?;
        let notify = SysfsPin::input(&config.gpio_root, config.notify_pin)?;

        info!(
            "Session open: {} @ {:#04x}, interrupt on gpio{}",
            config.bus_path.display(),
            config.address,
            config.notify_pin
        );

        Ok(Self {
            bus: Some(bus),
            notify: Some(notify),
            address: config.address,
        })
    }

    /// Write a whole frame to the sensor
    pub fn write_frame(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let address = self.address;
        self.write(address, bytes)
    }

    /// Read exactly `buf.len()` bytes from the sensor
    pub fn read_frame(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let address = self.address;
        self.read(address, buf)
    }

    /// Sample the interrupt line once; `true` while it is held low
    pub fn poll_notify(&mut self) -> bool {
        self.is_low()
    }

    pub fn is_open(&self) -> bool {
        self.bus.is_some() || self.notify.is_some()
    }

    /// Release both descriptors
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn close(&mut self) {
        let bus = self.bus.take();
        let notify = self.notify.take();
        if bus.is_some() || notify.is_some() {
            debug!("Closing session");
        }
    }

    fn bus(&mut self) -> Result<&mut LinuxI2c, TransportError> {
        self.bus.as_mut().ok_or(TransportError::Closed)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl I2cBus for Session {
    type Error = TransportError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus()?.write(address, data)?;
        self.address = address;
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus()?.read(address, buf)
    }
}

impl InputPin for Session {
    fn level(&mut self) -> Option<Level> {
        self.notify.as_mut()?.level()
    }
}
