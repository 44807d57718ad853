//! Process configuration, read once at startup from the environment.

use std::{fmt::Display, net::SocketAddr, str::FromStr, time::Duration as StdDuration};

use anyhow::{bail, Context, Result};
use embassy_time::Duration;

use crate::boards::raspberry_pi_zero::DEFAULT_I2C_BUS;

pub const DEFAULT_SERVICE_NAME: &str = "rpi-thermometer";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PUSH_INTERVAL_SECS: u64 = 15;
const DEFAULT_COLLECTION_INTERVAL_SECS: u64 = 10;
/// Upper bound for every period setting; keeps tick arithmetic in range
const MAX_PERIOD_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub service_name: String,
    pub environment: String,
    /// Push-gateway endpoint; `None` disables pushing
    pub exporter_url: Option<String>,
    pub push_interval: StdDuration,
    pub http_addr: SocketAddr,
    pub i2c_bus: u8,
    pub i2c_address: u8,
    pub collection_interval: Duration,
    pub quiescent_period: Duration,
    pub crc_check: bool,
    pub io_errors_fatal: bool,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup; unset or blank
    /// keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let collection_secs = parse_period(&get, "COLLECTION_INTERVAL_SECS", DEFAULT_COLLECTION_INTERVAL_SECS, 1)?;
        let push_secs = parse_period(&get, "METRICS_PUSH_INTERVAL_SECS", DEFAULT_PUSH_INTERVAL_SECS, 1)?;
        let quiescent_secs = parse_period(
            &get,
            "QUIESCENT_PERIOD_SECS",
            thermometer_telemetry::throttle::DEFAULT_QUIESCENT_PERIOD.as_secs(),
            0,
        )?;

        let i2c_address = match get("I2C_ADDRESS") {
            Some(raw) => parse_address(&raw).with_context(|| format!("invalid I2C_ADDRESS {raw:?}"))?,
            None => thermometer_telemetry::sensors::sht31::DEFAULT_ADDRESS,
        };

        let crc_check = match get("SENSOR_CRC_CHECK") {
            Some(raw) => parse_bool(&raw).with_context(|| format!("invalid SENSOR_CRC_CHECK {raw:?}"))?,
            None => false,
        };
        let io_errors_fatal = match get("IO_ERRORS_FATAL") {
            Some(raw) => parse_bool(&raw).with_context(|| format!("invalid IO_ERRORS_FATAL {raw:?}"))?,
            None => true,
        };

        let port: u16 = parse_or(&get, "PORT", DEFAULT_PORT)?;

        Ok(Self {
            service_name: get("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_owned()),
            environment: get("environment").unwrap_or_default(),
            exporter_url: get("METRICS_EXPORTER_URL"),
            push_interval: StdDuration::from_secs(push_secs),
            http_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            i2c_bus: parse_or(&get, "I2C_BUS", DEFAULT_I2C_BUS)?,
            i2c_address,
            collection_interval: Duration::from_secs(collection_secs),
            quiescent_period: Duration::from_secs(quiescent_secs),
            crc_check,
            io_errors_fatal,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|err| anyhow::anyhow!("invalid {key} {raw:?}: {err}")),
        None => Ok(default),
    }
}

/// Whole seconds in `min..=MAX_PERIOD_SECS`.
fn parse_period<G>(get: &G, key: &str, default: u64, min: u64) -> Result<u64>
where
    G: Fn(&str) -> Option<String>,
{
    let secs = parse_or(get, key, default)?;
    if !(min..=MAX_PERIOD_SECS).contains(&secs) {
        bail!("{key} must be between {min} and {MAX_PERIOD_SECS} seconds, got {secs}");
    }
    Ok(secs)
}

/// Accepts decimal or `0x`-prefixed hex; 7-bit addresses only.
fn parse_address(raw: &str) -> Result<u8> {
    let address = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => raw.parse()?,
    };
    if address > 0x7F {
        bail!("{address:#04x} is not a 7-bit address");
    }
    Ok(address)
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}
