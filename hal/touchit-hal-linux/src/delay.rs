//! Blocking delay for the poll loop

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// `DelayNs` backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}
