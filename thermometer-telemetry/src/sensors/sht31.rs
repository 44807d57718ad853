use crate::{Box, Error, ReadType, Sensor, SensorReading, transport::I2cTransport};
use async_trait::async_trait;
use embedded_hal_async::i2c::I2c;
use log::{debug, info};

/// Default SHT31-D address (ADDR pin pulled low)
pub const DEFAULT_ADDRESS: u8 = 0x44;

/// Single shot, high repeatability, clock stretching enabled
pub const MEASURE_SINGLE_SHOT: [u8; 2] = [0x2C, 0x06];

/// Length of a measurement response
pub const FRAME_LEN: usize = 6;

const CRC_POLYNOMIAL: u8 = 0x31;
const CRC_INIT: u8 = 0xFF;

/// Whether the per-channel checksums of a frame are checked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameValidation {
    /// Accept the frame as read; checksum bytes are ignored
    #[default]
    Skip,
    /// Reject frames whose checksum bytes disagree with their data
    Crc,
}

/// Measurement response: `[T_msb, T_lsb, T_crc, H_msb, H_lsb, H_crc]`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFrame([u8; FRAME_LEN]);

impl RawFrame {
    #[must_use]
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a frame from a buffer of unknown length
    ///
    /// # Errors
    /// * [`Error::ProtocolViolation`] unless `bytes` is exactly [`FRAME_LEN`] long
    pub fn from_slice<E>(bytes: &[u8]) -> Result<Self, Error<E>> {
        <[u8; FRAME_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| Error::ProtocolViolation {
                expected: FRAME_LEN,
                actual: bytes.len(),
            })
    }

    #[must_use]
    pub const fn raw_temperature(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    #[must_use]
    pub const fn raw_humidity(&self) -> u16 {
        u16::from_be_bytes([self.0[3], self.0[4]])
    }

    /// Check both channel checksums
    ///
    /// # Errors
    /// * [`Error::Crc`] naming the first channel that fails
    pub fn validate<E>(&self) -> Result<(), Error<E>> {
        let channels = [
            (ReadType::Temperature, &self.0[0..2], self.0[2]),
            (ReadType::Humidity, &self.0[3..5], self.0[5]),
        ];
        for (channel, data, expected) in channels {
            let actual = crc8(data);
            if actual != expected {
                return Err(Error::Crc {
                    channel,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Apply the sensor's transfer functions to both channels
    #[must_use]
    pub fn reading(&self) -> SensorReading {
        SensorReading::new(
            temperature_fahrenheit(self.raw_temperature()),
            humidity_percent(self.raw_humidity()),
        )
    }
}

/// `T[°F] = -49 + 315 * raw / (2^16 - 1)`, evaluated in single precision
#[must_use]
pub fn temperature_fahrenheit(raw: u16) -> f64 {
    let fahrenheit = (f32::from(raw) * 315.0) / 65535.0 - 49.0;
    f64::from(fahrenheit)
}

/// `RH[%] = 100 * raw / (2^16 - 1)`, evaluated in single precision
#[must_use]
pub fn humidity_percent(raw: u16) -> f64 {
    let humidity = (f32::from(raw) * 100.0) / 65535.0;
    f64::from(humidity)
}

/// Sensirion CRC-8: polynomial 0x31, init 0xFF, no final xor
#[must_use]
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(CRC_INIT, |crc, &byte| {
        let mut crc = crc ^ byte;
        for _ in 0..8 {
            crc = if crc & 0x80 == 0 {
                crc << 1
            } else {
                (crc << 1) ^ CRC_POLYNOMIAL
            };
        }
        crc
    })
}

/// Run one single-shot measurement over a borrowed transport
///
/// A failed command write returns before any read is attempted. Transport
/// errors are passed through untouched.
///
/// # Errors
/// * Any transport error from the write or the read
/// * [`Error::Crc`] when `validation` is [`FrameValidation::Crc`] and a
///   checksum does not match
pub async fn read<BUS: I2c>(
    transport: &mut I2cTransport<BUS>,
    validation: FrameValidation,
) -> Result<SensorReading, Error<BUS::Error>> {
    let written = transport.write_bytes(&MEASURE_SINGLE_SHOT).await?;
    debug!("sent {written} byte measurement command");

    let frame = RawFrame::new(transport.read_bytes::<FRAME_LEN>().await?);
    if validation == FrameValidation::Crc {
        frame.validate()?;
    }

    let reading = frame.reading();
    info!(
        "SHT31 measure()\n\t\t Temperature: {:.2} F\n\t\t Humidity: {:.2} RH",
        reading.temperature_f, reading.humidity_rh
    );
    Ok(reading)
}

/// SHT31-D on an I2C bus
pub struct Sht31<BUS> {
    transport: I2cTransport<BUS>,
    validation: FrameValidation,
}

impl<BUS> Sht31<BUS> {
    #[must_use]
    pub const fn new(transport: I2cTransport<BUS>) -> Self {
        Self {
            transport,
            validation: FrameValidation::Skip,
        }
    }

    #[must_use]
    pub fn with_validation(self, validation: FrameValidation) -> Self {
        Self { validation, ..self }
    }

    #[must_use]
    pub const fn transport(&self) -> &I2cTransport<BUS> {
        &self.transport
    }
}

#[async_trait(?Send)]
impl<BUS: I2c> Sensor for Sht31<BUS> {
    type Error = Error<BUS::Error>;

    async fn measure(&mut self) -> Result<SensorReading, Self::Error> {
        read(&mut self.transport, self.validation).await
    }

    fn release(&mut self) {
        if self.transport.close().is_some() {
            info!("SHT31 at {:#04x} released", self.transport.address());
        }
    }
}
