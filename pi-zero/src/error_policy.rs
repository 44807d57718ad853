//! What the process does when the sensor misbehaves.
//!
//! The default is to exit and let the supervisor restart us with a fresh bus
//! handle. Transient failures can instead be logged and skipped.

use std::fmt::Display;

use thermometer_telemetry::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Log, count, and wait for the next collection tick
    Recoverable,
    /// Log and exit with status 1
    Fatal,
}

/// Classify a sensor error under the configured policy.
pub const fn severity<E>(err: &Error<E>, io_errors_fatal: bool) -> Severity {
    if err.is_transient() && !io_errors_fatal {
        Severity::Recoverable
    } else {
        Severity::Fatal
    }
}

/// Report `err`; when `fatal`, terminate the process with status 1.
pub fn handle_error(err: &dyn Display, fatal: bool) {
    if fatal {
        exit_fatal(err);
    }
    tracing::error!(target: "rpi-thermometer", error = %err, "sensor error, skipping cycle");
}

pub fn exit_fatal(err: &dyn Display) -> ! {
    tracing::error!(target: "rpi-thermometer", error = %err, "fatal error, exiting");
    std::process::exit(1)
}
