//! Prometheus registry behind `/metrics` and the optional push exporter.

use std::{collections::HashMap, time::Duration};

use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use thermometer_telemetry::{Observation, ObservationSink};

use crate::config::Config;

pub const READ_GAUGE: &str = "rpi_thermometer_read";
pub const READ_ERRORS: &str = "rpi_thermometer_read_errors_total";

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    readings: GaugeVec,
    read_errors: IntCounterVec,
    job: String,
    exporter_url: Option<String>,
}

impl Metrics {
    /// Build the registry and register every collector on it.
    pub fn install(config: &Config) -> Result<Self, prometheus::Error> {
        let labels = HashMap::from([
            ("service_name".to_owned(), config.service_name.clone()),
            ("deployment_environment".to_owned(), config.environment.clone()),
        ]);
        let registry = Registry::new_custom(None, Some(labels))?;

        let readings = GaugeVec::new(
            Opts::new(READ_GAUGE, "Latest SHT31 reading, by read type"),
            &["read_type"],
        )?;
        registry.register(Box::new(readings.clone()))?;

        let read_errors = IntCounterVec::new(
            Opts::new(READ_ERRORS, "Sensor reads skipped because of a recoverable error"),
            &["kind"],
        )?;
        registry.register(Box::new(read_errors.clone()))?;

        Ok(Self {
            registry,
            readings,
            read_errors,
            job: config.service_name.replace('/', "_"),
            exporter_url: config.exporter_url.clone(),
        })
    }

    /// Sink handed to the sensor task
    pub fn sink(&self) -> PrometheusSink {
        PrometheusSink {
            readings: self.readings.clone(),
            read_errors: self.read_errors.clone(),
        }
    }

    /// Text exposition of the registry.
    pub fn encode(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(buf)
    }

    pub const fn exporter_enabled(&self) -> bool {
        self.exporter_url.is_some()
    }

    /// Blocking push of the whole registry to the push gateway.
    fn push(&self) -> Result<(), prometheus::Error> {
        let Some(url) = self.exporter_url.as_deref() else {
            return Ok(());
        };
        prometheus::push_metrics(&self.job, HashMap::new(), url, self.registry.gather(), None)
    }

    /// Push off the async runtime; failures are logged, never fatal.
    pub async fn flush(&self) {
        let metrics = self.clone();
        match tokio::task::spawn_blocking(move || metrics.push()).await {
            Ok(Ok(())) => tracing::debug!(target: "metrics", "pushed metrics"),
            Ok(Err(e)) => tracing::warn!(target: "metrics", error = %e, "failed to push metrics"),
            Err(e) => tracing::warn!(target: "metrics", error = %e, "metrics push task failed"),
        }
    }
}

#[cfg(test)]
impl Metrics {
    pub fn reading(&self, read_type: thermometer_telemetry::ReadType) -> f64 {
        self.readings.with_label_values(&[read_type.label()]).get()
    }

    pub fn read_error_count(&self, kind: &str) -> u64 {
        self.read_errors.with_label_values(&[kind]).get()
    }
}

/// Push the registry on a fixed interval until the task is dropped.
pub async fn run_exporter(metrics: Metrics, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        metrics.flush().await;
    }
}

/// Writes observations into the `rpi_thermometer_read` gauge.
#[derive(Clone)]
pub struct PrometheusSink {
    readings: GaugeVec,
    read_errors: IntCounterVec,
}

impl PrometheusSink {
    pub fn record_error(&self, kind: &str) {
        self.read_errors.with_label_values(&[kind]).inc();
    }
}

impl ObservationSink for PrometheusSink {
    fn observe(&mut self, observation: Observation) {
        self.readings
            .with_label_values(&[observation.read_type.label()])
            .set(observation.value);
    }
}
