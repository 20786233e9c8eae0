//! Frame encoding and decoding for the touchIt protocol.
//!
//! Frame format:
//! - START (1 byte): `'#'` (request) or `'$'` (response)
//! - COMMAND (1 byte): command identifier
//! - LENGTH (1 byte): payload length
//! - PAYLOAD (0-28 bytes): command-specific data
//! - CHECKSUM (1 byte): XOR of START, COMMAND, LENGTH and all PAYLOAD bytes

use core::fmt;

use heapless::Vec;

/// Start byte of a host request
pub const REQUEST_START: u8 = b'#';

/// Start byte of a sensor response
pub const RESPONSE_START: u8 = b'$';

/// START + COMMAND + LENGTH
pub const HEADER_SIZE: usize = 3;

/// Smallest valid frame (header + checksum, no payload)
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + 1;

/// Maximum complete frame size (one SMBus block transfer)
pub const MAX_FRAME_SIZE: usize = 32;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - MIN_FRAME_SIZE;

/// Errors that can occur during frame encoding or validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Fewer (or more) bytes than the command's response length
    ShortRead { expected: usize, received: usize },
    /// First byte is not the response start marker
    BadMarker(u8),
    /// Trailing byte does not match the XOR of the preceding bytes
    ChecksumMismatch { expected: u8, received: u8 },
    /// Frame is valid but its payload does not fit the command
    InvalidPayload,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::PayloadTooLarge => write!(f, "payload exceeds {MAX_PAYLOAD_SIZE} bytes"),
            FrameError::BufferTooSmall => write!(f, "buffer too small for frame"),
            FrameError::ShortRead { expected, received } => {
                write!(f, "expected {expected} bytes, got {received}")
            }
            FrameError::BadMarker(byte) => write!(f, "bad start marker {byte:#04x}"),
            FrameError::ChecksumMismatch { expected, received } => {
                write!(f, "checksum mismatch: computed {expected:#04x}, received {received:#04x}")
            }
            FrameError::InvalidPayload => write!(f, "payload does not match command"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for FrameError {}

/// XOR fold over `bytes`
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &byte| acc ^ byte)
}

/// A frame's command and payload, independent of direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command identifier
    pub command: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given command and payload
    pub fn new(command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            command,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(command: u8) -> Self {
        Self {
            command,
            payload: Vec::new(),
        }
    }

    /// Size of this frame on the wire
    pub fn wire_len(&self) -> usize {
        MIN_FRAME_SIZE + self.payload.len()
    }

    /// Encode this frame as a host request
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        self.encode_with_start(REQUEST_START, buffer)
    }

    /// Encode this frame as the sensor would send it
    ///
    /// Used to simulate the sensor side of an exchange.
    pub fn encode_response(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        self.encode_with_start(RESPONSE_START, buffer)
    }

    fn encode_with_start(&self, start: u8, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.wire_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let body = frame_len - 1;
        buffer[0] = start;
        buffer[1] = self.command;
        buffer[2] = self.payload.len() as u8;
        buffer[HEADER_SIZE..body].copy_from_slice(&self.payload);
        buffer[body] = checksum(&buffer[..body]);

        Ok(frame_len)
    }

    /// Encode this request into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }

    /// Encode this frame as a sensor response into a heapless Vec
    pub fn encode_response_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode_response(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }

    /// Validate a response read from the bus
    ///
    /// `raw` must hold exactly `expected_len` bytes, start with `'$'` and end
    /// with the XOR of everything before it. The declared LENGTH byte is not
    /// trusted; the payload is whatever sits between header and checksum.
    pub fn decode(raw: &[u8], expected_len: usize) -> Result<Self, FrameError> {
        if raw.len() != expected_len || raw.len() < MIN_FRAME_SIZE {
            return Err(FrameError::ShortRead {
                expected: expected_len,
                received: raw.len(),
            });
        }
        if raw.len() > MAX_FRAME_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        if raw[0] != RESPONSE_START {
            return Err(FrameError::BadMarker(raw[0]));
        }

        let (body, received) = raw.split_at(raw.len() - 1);
        let expected = checksum(body);
        if expected != received[0] {
            return Err(FrameError::ChecksumMismatch {
                expected,
                received: received[0],
            });
        }

        Self::new(raw[1], &body[HEADER_SIZE..])
    }
}

/// Build the request bytes for `command` carrying `payload`
pub fn encode(command: u8, payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    Frame::new(command, payload)?.encode_to_vec()
}

/// Validate a response of `expected_len` bytes and return its payload
pub fn decode(raw: &[u8], expected_len: usize) -> Result<Vec<u8, MAX_PAYLOAD_SIZE>, FrameError> {
    Frame::decode(raw, expected_len).map(|frame| frame.payload)
}
