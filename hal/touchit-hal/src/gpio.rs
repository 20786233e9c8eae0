//! GPIO pin abstractions
//!
//! Provides the input-pin trait used to sample the sensor's interrupt line.

/// Logic level of a sampled pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// Digital input pin
///
/// Sampling may touch the filesystem or a register, so it takes `&mut self`
/// and may fail. A failed or unreadable sample is neither high nor low.
pub trait InputPin {
    /// Sample the pin once, returning `None` if the read failed or was malformed
    fn level(&mut self) -> Option<Level>;

    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> bool {
        self.level() == Some(Level::High)
    }

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> bool {
        self.level() == Some(Level::Low)
    }
}

impl<T: InputPin + ?Sized> InputPin for &mut T {
    fn level(&mut self) -> Option<Level> {
        T::level(self)
    }
}
