#![cfg_attr(not(test), no_std)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
//#![warn(clippy::cargo)]

use alloc::boxed::Box;
use async_trait::async_trait;

// Use alloc crate
extern crate alloc;

/// Observations and the sinks that receive them
pub mod environmental_telemetry;

/// Errors raised by the transport, the drivers and the poller
pub mod error;

/// Periodic observation of a single sensor
pub mod poller;

/// Sensor specific code
pub mod sensors;

/// Minimum spacing between two hardware reads
pub mod throttle;

/// Byte-level access to one addressed device on an I2C bus
pub mod transport;

#[cfg(test)]
mod testutil;

pub use environmental_telemetry::{Observation, ObservationSink, ReadType};
pub use error::Error;
pub use poller::{PollOutcome, TelemetryPoller};
pub use sensors::sht31::{FrameValidation, RawFrame, Sht31};
pub use throttle::Throttle;
pub use transport::I2cTransport;

/// One decoded measurement, in engineering units.
///
/// Readings are produced once per poll cycle and never cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    /// Temperature in degrees Fahrenheit
    pub temperature_f: f64,
    /// Relative humidity in percent
    pub humidity_rh: f64,
}

impl SensorReading {
    #[must_use]
    pub const fn new(temperature_f: f64, humidity_rh: f64) -> Self {
        Self {
            temperature_f,
            humidity_rh,
        }
    }

    /// Temperature converted to degrees Celsius
    #[must_use]
    pub fn temperature_celsius(&self) -> f64 {
        (self.temperature_f - 32.0) * 5.0 / 9.0
    }

    /// The two observations carried by this reading, temperature first
    #[must_use]
    pub const fn observations(&self) -> [Observation; 2] {
        [
            Observation::new(self.temperature_f, ReadType::Temperature),
            Observation::new(self.humidity_rh, ReadType::Humidity),
        ]
    }
}

/// The trait required of any I2C sensor providing data
#[async_trait(?Send)]
pub trait Sensor {
    type Error;

    /// Bring the device into a state where [`Sensor::measure`] can be called
    async fn setup(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Perform exactly one hardware measurement
    async fn measure(&mut self) -> Result<SensorReading, Self::Error>;

    /// Release the underlying bus handle. Must be idempotent.
    fn release(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observations_pair_both_channels_of_one_reading() {
        let reading = SensorReading::new(72.5, 40.25);
        let [temperature, humidity] = reading.observations();
        assert_eq!(temperature, Observation::new(72.5, ReadType::Temperature));
        assert_eq!(humidity, Observation::new(40.25, ReadType::Humidity));
    }

    #[test]
    fn celsius_conversion() {
        assert!((SensorReading::new(212.0, 0.0).temperature_celsius() - 100.0).abs() < 1e-9);
        assert!((SensorReading::new(-40.0, 0.0).temperature_celsius() + 40.0).abs() < 1e-9);
    }
}
