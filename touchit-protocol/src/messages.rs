//! Command set of the touchIt sensor
//!
//! Every exchange is a host request followed, for all commands except
//! `SetAddress`, by a fixed-length response frame.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use crate::frame::{Frame, FrameError};

// Command IDs
pub const CMD_GET_VERSION: u8 = 0x00;
pub const CMD_SET_CONFIG: u8 = 0x01;
pub const CMD_SET_ADDRESS: u8 = 0x02;
pub const CMD_GET_POSITION: u8 = 0x03;
pub const CMD_GET_TOUCH: u8 = 0x04;

/// Commands understood by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Firmware version query
    GetVersion,
    /// Select which events raise the interrupt line
    SetConfig,
    /// Change the sensor's bus address
    SetAddress,
    /// Fine x/y position read
    GetPosition,
    /// Coarse touch read
    GetTouch,
}

impl Command {
    /// Wire identifier
    pub fn id(self) -> u8 {
        match self {
            Command::GetVersion => CMD_GET_VERSION,
            Command::SetConfig => CMD_SET_CONFIG,
            Command::SetAddress => CMD_SET_ADDRESS,
            Command::GetPosition => CMD_GET_POSITION,
            Command::GetTouch => CMD_GET_TOUCH,
        }
    }

    /// Parse a command from its wire identifier
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_GET_VERSION => Some(Command::GetVersion),
            CMD_SET_CONFIG => Some(Command::SetConfig),
            CMD_SET_ADDRESS => Some(Command::SetAddress),
            CMD_GET_POSITION => Some(Command::GetPosition),
            CMD_GET_TOUCH => Some(Command::GetTouch),
            _ => None,
        }
    }

    /// Length of the response frame, or `None` when the sensor sends nothing
    pub fn response_len(self) -> Option<usize> {
        match self {
            Command::GetVersion => Some(6),
            Command::SetConfig => Some(5),
            Command::SetAddress => None,
            Command::GetPosition => Some(8),
            Command::GetTouch => Some(5),
        }
    }
}

/// Bitmask of events that pull the interrupt line low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptConfig(u8);

impl InterruptConfig {
    pub const NONE: Self = Self(0x00);
    pub const X_MOVE: Self = Self(0x01);
    pub const Y_MOVE: Self = Self(0x02);
    pub const T_MOVE: Self = Self(0x04);
    pub const TAP: Self = Self(0x08);

    const ALL_BITS: u8 = 0x0F;

    /// Build from raw bits, dropping unknown ones
    pub fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for InterruptConfig {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for InterruptConfig {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Errors when validating a bus address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// Address outside 1..=127
    OutOfRange(u8),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::OutOfRange(addr) => {
                write!(f, "address {addr:#04x} outside 0x01..=0x7f")
            }
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for AddressError {}

/// 7-bit sensor address (1-127)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Factory address of every touchIt
    pub const DEFAULT: Self = Self(0x70);

    pub fn new(addr: u8) -> Result<Self, AddressError> {
        if (1..=0x7F).contains(&addr) {
            Ok(Self(addr))
        } else {
            Err(AddressError::OutOfRange(addr))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Requests from the host to the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    GetVersion,
    SetConfig(InterruptConfig),
    /// The sensor answers on the new address from the next transfer on
    SetAddress(Address),
    GetPosition,
    GetTouch,
}

impl Request {
    pub fn command(&self) -> Command {
        match self {
            Request::GetVersion => Command::GetVersion,
            Request::SetConfig(_) => Command::SetConfig,
            Request::SetAddress(_) => Command::SetAddress,
            Request::GetPosition => Command::GetPosition,
            Request::GetTouch => Command::GetTouch,
        }
    }

    /// Encode this request into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let id = self.command().id();
        match self {
            Request::SetConfig(config) => Frame::new(id, &[config.bits()]),
            Request::SetAddress(address) => Frame::new(id, &[address.get()]),
            Request::GetVersion | Request::GetPosition | Request::GetTouch => Ok(Frame::empty(id)),
        }
    }

    pub fn response_len(&self) -> Option<usize> {
        self.command().response_len()
    }
}
