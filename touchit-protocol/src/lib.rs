//! touchIt Bus Protocol
//!
//! This crate defines the framed request/response protocol spoken by the
//! touchIt capacitive touch sensor over I2C. The host sends a request frame,
//! then reads back a fixed-length response frame for the command.
//!
//! # Protocol Overview
//!
//! Requests and responses share one binary frame format:
//! ```text
//! ┌───────┬─────────┬────────┬─────────────┬──────────┐
//! │ START │ COMMAND │ LENGTH │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B      │ 1B     │ 0–28B       │ 1B       │
//! └───────┴─────────┴────────┴─────────────┴──────────┘
//! ```
//!
//! START is `'#'` for requests and `'$'` for responses. CHECKSUM is the XOR
//! of every preceding byte, START included.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod reports;

pub use frame::{
    checksum, decode, encode, Frame, FrameError, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, REQUEST_START,
    RESPONSE_START,
};
pub use messages::{Address, AddressError, Command, InterruptConfig, Request};
pub use reports::{Position, Touch, Version};
