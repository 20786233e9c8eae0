//! Errors raised while opening or using the Linux transport

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A setup step failed; the session cannot be used
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to open i2c bus {}", path.display())]
    OpenBus {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to bind i2c slave address {address:#04x}")]
    Bind {
        address: u8,
        #[source]
        source: io::Error,
    },
    #[error("failed to export gpio {pin}")]
    Export {
        pin: u32,
        #[source]
        source: io::Error,
    },
    #[error("failed to set gpio {pin} direction")]
    Direction {
        pin: u32,
        #[source]
        source: io::Error,
    },
    #[error("failed to open gpio {pin} value for reading")]
    OpenValue {
        pin: u32,
        #[source]
        source: io::Error,
    },
}

/// A single bus transfer failed; the session stays usable
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },
    #[error("short read: {read} of {expected} bytes")]
    ShortRead { expected: usize, read: usize },
    #[error("failed to bind i2c slave address {address:#04x}")]
    Bind {
        address: u8,
        #[source]
        source: io::Error,
    },
    #[error("session closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}
