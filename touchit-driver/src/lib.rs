//! touchIt sensor driver
//!
//! This crate builds the sensor's command set on top of the frame codec in
//! `touchit-protocol` and any transport implementing `touchit-hal`:
//!
//! - [`device::TouchIt`] - request/response exchanges (version, config,
//!   address, touch, position)
//! - [`poll::Poller`] - interrupt-driven read loop

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod device;
pub mod poll;

#[cfg(test)]
mod mock;

pub use device::{Error, TouchIt};
pub use poll::{PollEvent, PollState, PollStats, Poller, ReadMode, Report};
