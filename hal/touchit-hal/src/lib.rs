//! touchIt Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the touchIt driver is written
//! against. Platform crates implement them; the driver and poll loop stay
//! platform-agnostic and are tested against mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  touchit-driver (TouchIt, Poller)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  touchit-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ touchit-hal-  │
//!             │    linux      │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`gpio::InputPin`] - Interrupt line sampling
//! - [`Transport`] - A bus and an interrupt line owned together

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, Level};
pub use i2c::I2cBus;

/// Everything the driver needs to talk to one sensor
///
/// A transport owns both the bus the sensor sits on and the line the
/// sensor pulls low when it has an event pending.
pub trait Transport: I2cBus + InputPin {}

// Blanket implementation for types that implement both traits
impl<T: I2cBus + InputPin> Transport for T {}
