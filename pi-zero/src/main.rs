//! rpi-thermometer: SHT31 humidity/temperature telemetry for a Raspberry Pi.
//!
//! The sensor is polled on a fixed schedule from an embassy executor thread.
//! Readings are published on a Prometheus registry that is served on
//! `/metrics` and optionally pushed to a gateway. `/healthcheck` reports
//! process liveness.

mod boards;
mod config;
mod environmental_telemetry;
mod error_policy;
mod http;
mod init;
mod metrics;

use std::time::Duration;

use anyhow::{Context, Result};
use thermometer_telemetry::{FrameValidation, Sht31, TelemetryPoller};
use tokio::signal;

use crate::config::Config;
use crate::environmental_telemetry::{Schedule, SHUTDOWN};
use crate::metrics::Metrics;

/// How long shutdown waits for the sensor task to release the bus
const RELEASE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    init::init_tracing()?;

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(target: "rpi-thermometer", ?config, "starting");

    let metrics = Metrics::install(&config).context("failed to build metrics registry")?;

    let board = boards::init_board(&config).unwrap_or_else(|err| error_policy::exit_fatal(&err));
    let validation = if config.crc_check {
        FrameValidation::Crc
    } else {
        FrameValidation::Skip
    };
    let poller = TelemetryPoller::new(
        Sht31::new(board.sensor).with_validation(validation),
        config.quiescent_period,
    );

    let released = environmental_telemetry::spawn(
        poller,
        metrics.sink(),
        Schedule {
            interval: config.collection_interval,
            io_errors_fatal: config.io_errors_fatal,
        },
    )
    .context("failed to start sensor thread")?;

    let exporter = metrics
        .exporter_enabled()
        .then(|| tokio::spawn(metrics::run_exporter(metrics.clone(), config.push_interval)));

    let served = http::run_server(config.http_addr, metrics.clone(), shutdown_signal()).await;

    SHUTDOWN.signal(());
    match tokio::time::timeout(RELEASE_TIMEOUT, released).await {
        Ok(Ok(())) => tracing::info!(target: "rpi-thermometer", "sensor bus closed"),
        Ok(Err(_)) => tracing::warn!(target: "rpi-thermometer", "sensor task ended without releasing the bus"),
        Err(_) => tracing::warn!(target: "rpi-thermometer", "timed out waiting for the sensor task"),
    }

    if let Some(exporter) = exporter {
        exporter.abort();
        metrics.flush().await;
    }

    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(target: "rpi-thermometer", error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(target: "rpi-thermometer", error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!(target: "rpi-thermometer", "shutting down gracefully");
}
