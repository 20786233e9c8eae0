//! In-memory transport for driver and poll-loop tests

use std::collections::VecDeque;

use touchit_hal::{I2cBus, InputPin, Level};
use touchit_protocol::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    ShortWrite,
    ShortRead,
}

/// Records every transfer and replays queued responses and line samples
#[derive(Debug, Default)]
pub struct MockTransport {
    /// (address, bytes) of every successful write
    pub writes: Vec<(u8, Vec<u8>)>,
    /// (address, length) of every read attempt
    pub reads: Vec<(u8, usize)>,
    pub fail_writes: bool,
    responses: VecDeque<Vec<u8>>,
    notify: VecDeque<bool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_response(&mut self, raw: Vec<u8>) {
        self.responses.push_back(raw);
    }

    /// Queue line samples; `true` means held low. Empty queue reads high.
    pub fn queue_notify(&mut self, samples: &[bool]) {
        self.notify.extend(samples.iter().copied());
    }

    pub fn writes_of(&self, command: u8) -> usize {
        self.writes
            .iter()
            .filter(|(_, bytes)| bytes.get(1) == Some(&command))
            .count()
    }
}

impl I2cBus for MockTransport {
    type Error = MockError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockError::ShortWrite);
        }
        self.writes.push((address, data.to_vec()));
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.reads.push((address, buf.len()));
        let raw = self.responses.pop_front().unwrap_or_default();
        if raw.len() < buf.len() {
            return Err(MockError::ShortRead);
        }
        buf.copy_from_slice(&raw[..buf.len()]);
        Ok(())
    }
}

impl InputPin for MockTransport {
    fn level(&mut self) -> Option<Level> {
        match self.notify.pop_front() {
            Some(true) => Some(Level::Low),
            _ => Some(Level::High),
        }
    }
}

/// Response bytes exactly as the sensor sends them
pub fn response(command: u8, payload: &[u8]) -> Vec<u8> {
    Frame::new(command, payload)
        .unwrap()
        .encode_response_to_vec()
        .unwrap()
        .to_vec()
}
