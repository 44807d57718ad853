//! Raspberry Pi Zero W with an SHT31-D breakout
//!
//! Bus assignments for the Pi Zero header
//!
//! - I2C: bus 1 (`/dev/i2c-1`; SDA: GPIO2, SCL: GPIO3), enabled with
//!   `dtparam=i2c_arm=on`
//! - SHT31-D: address 0x44 with ADDR tied low, 0x45 with ADDR tied high
//!
//! Run `i2cdetect -y 1` to confirm the sensor answers on the expected address.

use linux_embedded_hal::I2CError;
use thermometer_telemetry::Error;

use super::{bus_path, open_sensor_bus, BoardPeripherals};
use crate::config::Config;

/// Bus wired to the header's SDA/SCL pins
pub const DEFAULT_I2C_BUS: u8 = 1;

pub fn init_board(config: &Config) -> Result<BoardPeripherals, Error<I2CError>> {
    let sensor = open_sensor_bus(&bus_path(config.i2c_bus), config.i2c_address)?;
    Ok(BoardPeripherals { sensor })
}
