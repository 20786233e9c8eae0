//! Data carried by sensor responses

use core::fmt;

use crate::frame::{Frame, FrameError};

/// Firmware version reported by `GetVersion`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.payload.as_slice() {
            [major, minor, ..] => Ok(Self {
                major: *major,
                minor: *minor,
            }),
            _ => Err(FrameError::InvalidPayload),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Coarse touch reading from `GetTouch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Touch {
    /// Pad position reported by the sensor
    pub position: u8,
}

impl Touch {
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let position = *frame.payload.first().ok_or(FrameError::InvalidPayload)?;
        Ok(Self { position })
    }
}

/// Fine x/y reading from `GetPosition`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

impl Position {
    /// Payload: [x_hi][x_lo][y_hi][y_lo]
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.payload.as_slice() {
            [x_hi, x_lo, y_hi, y_lo, ..] => Ok(Self {
                x: u16::from_be_bytes([*x_hi, *x_lo]),
                y: u16::from_be_bytes([*y_hi, *y_lo]),
            }),
            _ => Err(FrameError::InvalidPayload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{CMD_GET_POSITION, CMD_GET_TOUCH, CMD_GET_VERSION};

    #[test]
    fn test_version_from_frame() {
        let frame = Frame::new(CMD_GET_VERSION, &[1, 4]).unwrap();
        let version = Version::from_frame(&frame).unwrap();
        assert_eq!(version, Version { major: 1, minor: 4 });
    }

    #[test]
    fn test_version_short_payload() {
        let frame = Frame::new(CMD_GET_VERSION, &[1]).unwrap();
        assert_eq!(Version::from_frame(&frame), Err(FrameError::InvalidPayload));
    }

    #[test]
    fn test_touch_from_frame() {
        let frame = Frame::new(CMD_GET_TOUCH, &[0x05]).unwrap();
        assert_eq!(Touch::from_frame(&frame).unwrap().position, 0x05);
        assert_eq!(
            Touch::from_frame(&Frame::empty(CMD_GET_TOUCH)),
            Err(FrameError::InvalidPayload)
        );
    }

    #[test]
    fn test_position_is_big_endian() {
        let frame = Frame::new(CMD_GET_POSITION, &[0x01, 0x02, 0x00, 0xFF]).unwrap();
        let position = Position::from_frame(&frame).unwrap();
        assert_eq!(position, Position { x: 0x0102, y: 0x00FF });
    }
}
