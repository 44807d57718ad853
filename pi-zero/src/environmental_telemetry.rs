//! Sensor side of the process.
//!
//! A single embassy executor on its own thread owns the poller, and with it
//! the only handle on the I2C device. Collection ticks run strictly one after
//! another, so bus transactions never interleave.

use core::fmt::Debug;

use embassy_executor::Executor;
use embassy_futures::select::{select, Either};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use thermometer_telemetry::{Error, PollOutcome, Sensor, Sht31, TelemetryPoller};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::boards::LinuxI2c;
use crate::error_policy::{self, Severity};
use crate::metrics::PrometheusSink;

pub type Poller = TelemetryPoller<Sht31<LinuxI2c>>;

pub type ShutdownSignal = Signal<CriticalSectionRawMutex, ()>;

/// Raised once by the main thread to stop collection and release the bus
pub static SHUTDOWN: ShutdownSignal = Signal::new();

#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub interval: Duration,
    pub io_errors_fatal: bool,
}

/// Source of collection ticks
pub trait Tick {
    async fn tick(&mut self);
}

impl Tick for Ticker {
    async fn tick(&mut self) {
        self.next().await;
    }
}

/// Start the sensor executor thread.
///
/// The returned receiver completes once the transport has been closed after
/// [`SHUTDOWN`] is signalled.
pub fn spawn(
    poller: Poller,
    sink: PrometheusSink,
    schedule: Schedule,
) -> std::io::Result<oneshot::Receiver<()>> {
    let (released_tx, released_rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("sensor".into())
        .spawn(move || {
            static EXECUTOR: StaticCell<Executor> = StaticCell::new();
            let executor = EXECUTOR.init(Executor::new());
            executor.run(move |spawner| {
                spawner.must_spawn(telemetry_task(poller, sink, schedule, released_tx));
            })
        })?;
    Ok(released_rx)
}

#[embassy_executor::task]
async fn telemetry_task(
    mut poller: Poller,
    mut sink: PrometheusSink,
    schedule: Schedule,
    released: oneshot::Sender<()>,
) {
    let mut ticker = Ticker::every(schedule.interval);
    run(
        &mut poller,
        &mut sink,
        &mut ticker,
        &SHUTDOWN,
        schedule.io_errors_fatal,
    )
    .await;
    if released.send(()).is_err() {
        warn!("shutdown acknowledgement dropped");
    }
}

/// Collect until `shutdown` is raised, then close the sensor.
///
/// Reads immediately, then once per tick. Fatal errors close the sensor and
/// exit the process.
pub async fn run<S, E, T>(
    poller: &mut TelemetryPoller<S>,
    sink: &mut PrometheusSink,
    ticks: &mut T,
    shutdown: &ShutdownSignal,
    io_errors_fatal: bool,
) where
    S: Sensor<Error = Error<E>>,
    E: Debug,
    T: Tick,
{
    info!(
        quiescent_secs = poller.throttle().quiescent().as_secs(),
        io_errors_fatal, "starting collection"
    );
    if let Err(err) = poller.setup().await {
        poller.close();
        error_policy::exit_fatal(&err);
    }

    loop {
        match poller.poll(sink).await {
            Ok(PollOutcome::Observed(_)) => {}
            Ok(PollOutcome::Throttled { remaining }) => {
                debug!(remaining_ms = remaining.as_millis(), "collection tick throttled");
            }
            Err(err) => match error_policy::severity(&err, io_errors_fatal) {
                Severity::Recoverable => {
                    sink.record_error(err.kind());
                    error_policy::handle_error(&err, false);
                }
                Severity::Fatal => {
                    poller.close();
                    error_policy::exit_fatal(&err);
                }
            },
        }

        if let Either::First(()) = select(shutdown.wait(), ticks.tick()).await {
            break;
        }
    }

    poller.close();
    info!("sensor released");
}
