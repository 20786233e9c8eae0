//! Linux HAL for the touchIt driver
//!
//! This crate provides Linux implementations of the shared `touchit-hal`
//! traits for a sensor wired to a single-board computer:
//!
//! - [`i2c::LinuxI2c`] - `/dev/i2c-N` character device, slave bound by ioctl
//! - [`gpio::SysfsPin`] - interrupt line read through `/sys/class/gpio`
//! - [`delay::StdDelay`] - `embedded-hal` delay backed by `thread::sleep`
//! - [`session::Session`] - the bus and the interrupt line opened together

pub mod delay;
pub mod error;
pub mod gpio;
pub mod i2c;
pub mod session;

pub use delay::StdDelay;
pub use error::{SetupError, TransportError};
pub use gpio::SysfsPin;
pub use i2c::LinuxI2c;
pub use session::{Session, SessionConfig};

// Re-export shared traits from touchit-hal for convenience
pub use touchit_hal::{I2cBus, InputPin, Level, Transport};
