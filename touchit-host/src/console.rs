//! Console lines for the user
//!
//! Results go to stdout, one line per event; diagnostics go to the log.

use std::io::{self, Write};

use touchit_driver::Report;
use touchit_protocol::{Address, Version};

pub fn version_line(version: Option<Version>) -> String {
    match version {
        Some(version) => format!("touchIt FW Ver: {version}"),
        None => String::from("touchIt FW Ver: unknown"),
    }
}

pub fn config_line(acknowledged: bool) -> &'static str {
    if acknowledged {
        "Config write OK!"
    } else {
        "Config write failed"
    }
}

pub fn report_line(report: &Report) -> String {
    match report {
        Report::Touch(touch) => format!("pos: {}", touch.position),
        Report::Position(position) => format!("x: {}\ty: {}", position.x, position.y),
    }
}

pub fn address_line(old: Address, new: Address) -> String {
    format!("touchIt I2C address changed from {old} to {new}")
}

/// Print a line and flush so piped output sees every event at once
pub fn emit(line: &str) {
    let mut stdout = io::stdout().lock();
    // A closed stdout must not stop the poll loop
    let _ = writeln!(stdout, "{line}").and_then(|()| stdout.flush());
}
