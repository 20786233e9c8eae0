//! I2C bus abstractions
//!
//! Provides traits for I2C master operations that can be implemented
//! by platform-specific HALs.

use core::fmt::Debug;

/// I2C bus master
///
/// Both operations are all-or-nothing: a transfer that moves fewer bytes
/// than requested is an error.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: Debug;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to fill completely
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        T::write(self, address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        T::read(self, address, buf)
    }
}
