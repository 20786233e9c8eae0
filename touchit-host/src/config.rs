//! Host configuration
//!
//! Loaded from an optional TOML file; every key has a default matching the
//! stock Raspberry Pi wiring (bus 1, address 0x70, interrupt on BCM 17).
//!
//! ```toml
//! [bus]
//! device = "/dev/i2c-1"
//! address = 0x70
//!
//! [notify]
//! pin = 17
//! gpio_root = "/sys/class/gpio"
//!
//! [poll]
//! interval_us = 1000
//! mode = "touch"
//!
//! [events]
//! t_move = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;
use touchit_driver::poll::{DEFAULT_INTERVAL_US, MAX_INTERVAL_US};
use touchit_driver::ReadMode;
use touchit_hal_linux::SessionConfig;
use touchit_protocol::{Address, AddressError, InterruptConfig};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file")]
    Parse(#[from] toml::de::Error),
    #[error("invalid sensor address")]
    Address(#[from] AddressError),
    #[error("poll interval {0} us exceeds {max} us", max = MAX_INTERVAL_US)]
    Interval(u32),
}

/// What each interrupt reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Coarse pad position (GetTouch)
    #[default]
    Touch,
    /// Fine x/y position (GetPosition)
    Position,
}

impl From<Mode> for ReadMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Touch => ReadMode::Touch,
            Mode::Position => ReadMode::Position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    pub device: PathBuf,
    pub address: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/i2c-1"),
            address: Address::DEFAULT.get(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyConfig {
    pub pin: u32,
    pub gpio_root: PathBuf,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            pin: 17,
            gpio_root: PathBuf::from(touchit_hal_linux::gpio::SYSFS_GPIO_ROOT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    /// Pause between idle samples; 0 busy-spins, at most one second
    pub interval_us: u32,
    pub mode: Mode,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_us: DEFAULT_INTERVAL_US,
            mode: Mode::Touch,
        }
    }
}

/// Events that raise the interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    pub x_move: bool,
    pub y_move: bool,
    pub t_move: bool,
    pub tap: bool,
}

impl From<EventsConfig> for InterruptConfig {
    fn from(events: EventsConfig) -> Self {
        let mut config = InterruptConfig::NONE;
        if events.x_move {
            config |= InterruptConfig::X_MOVE;
        }
        if events.y_move {
            config |= InterruptConfig::Y_MOVE;
        }
        if events.t_move {
            config |= InterruptConfig::T_MOVE;
        }
        if events.tap {
            config |= InterruptConfig::TAP;
        }
        config
    }
}

/// Complete host configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bus: BusConfig,
    pub notify: NotifyConfig,
    pub poll: PollConfig,
    /// Unset means the default for the poll mode
    pub events: Option<EventsConfig>,
}

impl Config {
    /// Load from `path`, or use defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the types alone don't bound
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.address()?;
        if self.poll.interval_us > MAX_INTERVAL_US {
            return Err(ConfigError::Interval(self.poll.interval_us));
        }
        Ok(())
    }

    pub fn address(&self) -> Result<Address, AddressError> {
        Address::new(self.bus.address)
    }

    /// Interrupt events to request from the sensor
    ///
    /// Touch mode wakes on touch movement; position mode on x/y movement.
    pub fn interrupt_config(&self) -> InterruptConfig {
        match (self.events, self.poll.mode) {
            (Some(events), _) => events.into(),
            (None, Mode::Touch) => InterruptConfig::T_MOVE,
            (None, Mode::Position) => InterruptConfig::X_MOVE | InterruptConfig::Y_MOVE,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            bus_path: self.bus.device.clone(),
            address: self.bus.address,
            notify_pin: self.notify.pin,
            gpio_root: self.notify.gpio_root.clone(),
        }
    }
}

/// Parse a bus address given as decimal or `0x` hex
pub fn parse_address(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| format!("invalid address '{s}': {e}"))?;

    Address::new(value)
        .map(Address::get)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bus.device, PathBuf::from("/dev/i2c-1"));
        assert_eq!(config.bus.address, 0x70);
        assert_eq!(config.notify.pin, 17);
        assert_eq!(config.notify.gpio_root, PathBuf::from("/sys/class/gpio"));
        assert_eq!(config.poll.interval_us, 1_000);
        assert_eq!(config.poll.mode, Mode::Touch);
        assert_eq!(config.interrupt_config(), InterruptConfig::T_MOVE);
    }

    #[test]
    fn test_parse_full_file() {
        let config = Config::from_toml(
            r#"
            [bus]
            device = "/dev/i2c-0"
            address = 0x72

            [notify]
            pin = 27

            [poll]
            interval_us = 0
            mode = "position"

            [events]
            x_move = true
            tap = true
            "#,
        )
        .unwrap();

        assert_eq!(config.bus.device, PathBuf::from("/dev/i2c-0"));
        assert_eq!(config.address().unwrap().get(), 0x72);
        assert_eq!(config.notify.pin, 27);
        assert_eq!(config.poll.interval_us, 0);
        assert_eq!(ReadMode::from(config.poll.mode), ReadMode::Position);
        assert_eq!(config.interrupt_config().bits(), 0x09);

        let session = config.session_config();
        assert_eq!(session.address, 0x72);
        assert_eq!(session.notify_pin, 27);
    }

    #[test]
    fn test_position_mode_default_events() {
        let config = Config::from_toml("[poll]\nmode = \"position\"\n").unwrap();
        assert_eq!(
            config.interrupt_config(),
            InterruptConfig::X_MOVE | InterruptConfig::Y_MOVE
        );
    }

    #[test]
    fn test_rejects_out_of_range_address() {
        let err = Config::from_toml("[bus]\naddress = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Address(AddressError::OutOfRange(0))));
    }

    #[test]
    fn test_rejects_long_interval() {
        let err = Config::from_toml("[poll]\ninterval_us = 4000000000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Interval(4_000_000_000)));

        let config = Config::from_toml("[poll]\ninterval_us = 1000000\n").unwrap();
        assert_eq!(config.poll.interval_us, MAX_INTERVAL_US);
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = Config::from_toml("[bus]\nspeed = 400000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notify]\npin = 4").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.notify.pin, 4);
        assert_eq!(config.bus, BusConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/touchit.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x72"), Ok(0x72));
        assert_eq!(parse_address("114"), Ok(114));
        assert!(parse_address("0x80").is_err());
        assert!(parse_address("0").is_err());
        assert!(parse_address("seventy").is_err());
    }
}
