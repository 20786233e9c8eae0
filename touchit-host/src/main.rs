//! touchIt host program
//!
//! Drives a touchIt capacitive touch sensor from a Linux single-board
//! computer: the sensor sits on an i2c-dev bus and signals events by pulling
//! a GPIO line low.
//!
//! # Usage
//!
//! ```bash
//! # Print every touch until Ctrl+C
//! touchit run
//!
//! # Print fine x/y positions, sampling the line every 500 µs
//! touchit run --mode position --interval-us 500
//!
//! # Read the firmware version
//! touchit version
//!
//! # Move the sensor from 0x70 to 0x72
//! touchit set-address 0x72
//! ```

mod config;
mod console;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use touchit_driver::poll::MAX_INTERVAL_US;
use touchit_driver::{Poller, TouchIt};
use touchit_hal_linux::{Session, StdDelay, Transport};
use touchit_protocol::Address;

use crate::config::{parse_address, Config, Mode};

/// touchIt host driver
#[derive(Parser)]
#[command(name = "touchit")]
#[command(version)]
#[command(about = "Host driver for the touchIt capacitive touch sensor")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// i2c-dev bus device (e.g., /dev/i2c-1)
    #[arg(long, global = true)]
    device: Option<PathBuf>,

    /// Sensor bus address, decimal or 0x hex
    #[arg(long, global = true, value_parser = parse_address)]
    address: Option<u8>,

    /// GPIO number of the sensor's interrupt line
    #[arg(long, global = true)]
    pin: Option<u32>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the interrupt line and print every event (default)
    Run {
        /// What to read on each event
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Pause between idle samples in microseconds; 0 busy-spins
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_INTERVAL_US)))]
        interval_us: Option<u32>,
    },

    /// Print the sensor firmware version
    Version,

    /// Move the sensor to a new bus address (1-127)
    SetAddress {
        /// New address, decimal or 0x hex
        #[arg(value_parser = parse_address)]
        new_address: u8,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(device) = cli.device {
        config.bus.device = device;
    }
    if let Some(address) = cli.address {
        config.bus.address = address;
    }
    if let Some(pin) = cli.pin {
        config.notify.pin = pin;
    }

    match cli.command.unwrap_or(Commands::Run {
        mode: None,
        interval_us: None,
    }) {
        Commands::Run { mode, interval_us } => {
            if let Some(mode) = mode {
                config.poll.mode = mode;
            }
            if let Some(interval_us) = interval_us {
                config.poll.interval_us = interval_us;
            }
            config.validate().context("Invalid configuration")?;
            watch(&config)
        }
        Commands::Version => version(&config),
        Commands::SetAddress { new_address } => {
            let new_address = Address::new(new_address)?;
            set_address(&config, new_address)
        }
    }
}

fn open(config: &Config) -> Result<TouchIt<Session>> {
    let address = config.address()?;
    let session = Session::open(&config.session_config()).context("Failed to set up touchIt")?;
    Ok(TouchIt::new(session, address))
}

/// Configure the sensor and print events until a signal arrives
fn watch(config: &Config) -> Result<ExitCode> {
    shutdown::install().context("Failed to install signal handlers")?;

    let mut device = open(config)?;
    console::emit(&identify(&mut device));
    console::emit(console::config_line(
        device.configure(config.interrupt_config()),
    ));

    let stats = Poller::new(&mut device, StdDelay, config.poll.mode.into())
        .with_interval_us(config.poll.interval_us)
        .run(shutdown::flag(), |report| {
            console::emit(&console::report_line(&report))
        });

    info!(
        "Shutting down after {} events ({} failed)",
        stats.events, stats.failures
    );
    device.release().close();

    // Only a signal ends the loop
    Ok(ExitCode::from(1))
}

/// Version line for the sensor; a failed query reads as unknown
fn identify<T: Transport>(device: &mut TouchIt<T>) -> String {
    console::version_line(device.identify())
}

fn version(config: &Config) -> Result<ExitCode> {
    let mut device = open(config)?;
    console::emit(&identify(&mut device));
    Ok(ExitCode::SUCCESS)
}

fn set_address(config: &Config, new_address: Address) -> Result<ExitCode> {
    let mut device = open(config)?;
    console::emit(&identify(&mut device));

    let old_address = device.address();
    device
        .set_address(new_address)
        .with_context(|| format!("Failed to send new address {new_address}"))?;
    console::emit(&console::address_line(old_address, new_address));
    info!("Use --address {new_address} for this sensor from now on");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use touchit_hal_linux::{I2cBus, InputPin, Level, TransportError};

    /// Sensor that never answers
    struct Unplugged;

    impl I2cBus for Unplugged {
        type Error = TransportError;

        fn write(&mut self, _address: u8, _data: &[u8]) -> Result<(), Self::Error> {
            Err(TransportError::Closed)
        }

        fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), Self::Error> {
            Err(TransportError::Closed)
        }
    }

    impl InputPin for Unplugged {
        fn level(&mut self) -> Option<Level> {
            None
        }
    }

    #[test]
    fn test_failed_version_reads_unknown() {
        let mut device = TouchIt::new(Unplugged, Address::DEFAULT);
        assert_eq!(identify(&mut device), "touchIt FW Ver: unknown");
    }

    #[test]
    fn test_interval_range_checked() {
        assert!(Cli::try_parse_from(["touchit", "run", "--interval-us", "1000000"]).is_ok());
        assert!(Cli::try_parse_from(["touchit", "run", "--interval-us", "1000001"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::try_parse_from(["touchit"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "touchit",
            "run",
            "--mode",
            "position",
            "--address",
            "0x71",
            "--pin",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.address, Some(0x71));
        assert_eq!(cli.pin, Some(4));
        assert!(matches!(
            cli.command,
            Some(Commands::Run {
                mode: Some(Mode::Position),
                interval_us: None
            })
        ));
    }

    #[test]
    fn test_set_address_range_checked() {
        assert!(Cli::try_parse_from(["touchit", "set-address", "0x72"]).is_ok());
        assert!(Cli::try_parse_from(["touchit", "set-address", "200"]).is_err());
        assert!(Cli::try_parse_from(["touchit", "set-address", "0"]).is_err());
    }
}
