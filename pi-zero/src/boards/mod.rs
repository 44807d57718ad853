//! Board-specific configurations and bus assignments
//!
//! This module provides board-specific abstractions that isolate
//! hardware dependencies from the main application logic.

use std::path::{Path, PathBuf};

use embassy_embedded_hal::adapter::BlockingAsync;
use linux_embedded_hal::{I2CError, I2cdev};
use thermometer_telemetry::{Error, I2cTransport};
use tracing::info;

use crate::config::Config;

// Import board-specific modules based on features
#[cfg(feature = "board-raspberry-pi-zero")]
pub mod raspberry_pi_zero;

/// Blocking Linux i2c-dev handle driven through the async I2C trait
pub type LinuxI2c = BlockingAsync<I2cdev>;

/// Alias the sensor's transport on the board's I2C bus
pub type I2CSensor = I2cTransport<LinuxI2c>;

/// Board-specific peripheral configuration
pub struct BoardPeripherals {
    /// Exclusive handle on the humidity/temperature sensor
    pub sensor: I2CSensor,
}

/// Character device for I2C bus `index`, following the i2c-dev convention
#[must_use]
pub fn bus_path(index: u8) -> PathBuf {
    PathBuf::from(format!("/dev/i2c-{index}"))
}

/// Open exclusive access to one device on a bus
///
/// # Errors
/// * [`Error::TransportUnavailable`] when the device node cannot be opened
///   (no such bus, permission denied, i2c-dev not loaded)
pub fn open_sensor_bus(bus: &Path, address: u8) -> Result<I2CSensor, Error<I2CError>> {
    let dev = I2cdev::new(bus).map_err(|err| Error::TransportUnavailable(I2CError::from(err)))?;
    info!(bus = %bus.display(), address = format_args!("{address:#04x}"), "opened i2c device");
    Ok(I2cTransport::new(BlockingAsync::new(dev), address))
}

/// Initialize board-specific peripherals
///
/// This function opens the buses named by the configuration according to
/// the selected board's wiring.
#[cfg(feature = "board-raspberry-pi-zero")]
pub fn init_board(config: &Config) -> Result<BoardPeripherals, Error<I2CError>> {
    raspberry_pi_zero::init_board(config)
}

// Default fallback if no board is selected
#[cfg(not(any(feature = "board-raspberry-pi-zero",)))]
compile_error!("No board selected! Please enable a board feature like 'board-raspberry-pi-zero'");
