//! Bridge between a metrics-collection schedule and a [`Sensor`].
//!
//! The schedule calls [`TelemetryPoller::poll`] on every collection tick.
//! Each call performs at most one hardware read and, when the read succeeds,
//! emits exactly one temperature and one humidity observation from that
//! read. Calls arriving within the quiescent period of the last successful
//! read are answered without touching the bus.

use crate::{ObservationSink, Sensor, SensorReading, throttle::Throttle};
use embassy_time::{Duration, Instant};
use log::debug;

/// Result of one collection tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PollOutcome {
    /// A read completed and both observations were emitted
    Observed(SensorReading),
    /// The quiescent period had not elapsed; nothing was read or emitted
    Throttled { remaining: Duration },
}

pub struct TelemetryPoller<S> {
    sensor: S,
    throttle: Throttle,
}

impl<S: Sensor> TelemetryPoller<S> {
    #[must_use]
    pub const fn new(sensor: S, quiescent: Duration) -> Self {
        Self {
            sensor,
            throttle: Throttle::new(quiescent),
        }
    }

    #[must_use]
    pub const fn sensor(&self) -> &S {
        &self.sensor
    }

    #[must_use]
    pub const fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Prepare the sensor before the first tick.
    ///
    /// # Errors
    /// * Any error from [`Sensor::setup`]
    pub async fn setup(&mut self) -> Result<(), S::Error> {
        self.sensor.setup().await
    }

    /// Handle one collection tick.
    ///
    /// # Errors
    /// * Any error from the sensor read. Nothing is emitted for that tick and
    ///   the throttle is left untouched, so the next tick reads again.
    pub async fn poll<K>(&mut self, sink: &mut K) -> Result<PollOutcome, S::Error>
    where
        K: ObservationSink + ?Sized,
    {
        let now = Instant::now();
        if !self.throttle.ready(now) {
            let remaining = self.throttle.remaining(now);
            debug!("read throttled, {} ms remaining", remaining.as_millis());
            return Ok(PollOutcome::Throttled { remaining });
        }

        let reading = self.sensor.measure().await?;
        self.throttle.mark(Instant::now());

        for observation in reading.observations() {
            sink.observe(observation);
        }
        Ok(PollOutcome::Observed(reading))
    }

    /// Release the sensor's bus handle; safe to call more than once
    pub fn close(&mut self) {
        self.sensor.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockBus;
    use crate::{Error, I2cTransport, Observation, ReadType, Sht31};
    use embassy_futures::block_on;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

    const NACK: ErrorKind = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);

    fn poller(bus: MockBus, quiescent: Duration) -> TelemetryPoller<Sht31<MockBus>> {
        TelemetryPoller::new(Sht31::new(I2cTransport::new(bus, 0x44)), quiescent)
    }

    fn bus(poller: &TelemetryPoller<Sht31<MockBus>>) -> &MockBus {
        poller.sensor().transport().bus().unwrap()
    }

    #[test]
    fn successful_read_emits_both_observations() {
        let mut poller = poller(
            MockBus::with_frames([[0x62, 0x5A, 0x00, 0x6C, 0xC5, 0x00]]),
            Duration::from_secs(5),
        );
        let mut sink: Vec<Observation> = Vec::new();

        let outcome = block_on(poller.poll(&mut sink)).unwrap();
        let PollOutcome::Observed(reading) = outcome else {
            panic!("expected a reading, got {outcome:?}");
        };
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0], Observation::new(reading.temperature_f, ReadType::Temperature));
        assert_eq!(sink[1], Observation::new(reading.humidity_rh, ReadType::Humidity));
    }

    #[test]
    fn consecutive_cycles_pair_values_from_the_same_frame() {
        let first = [0x62, 0x5A, 0x00, 0x6C, 0xC5, 0x00];
        let second = [0x66, 0x82, 0x00, 0x6D, 0x2C, 0x00];
        let mut poller = poller(MockBus::with_frames([first, second]), Duration::from_ticks(0));

        let mut cycles: Vec<Vec<Observation>> = Vec::new();
        for _ in 0..2 {
            let mut sink = Vec::new();
            block_on(poller.poll(&mut sink)).unwrap();
            cycles.push(sink);
        }

        for (cycle, frame) in cycles.iter().zip([first, second]) {
            let expected = crate::RawFrame::new(frame).reading();
            assert_eq!(cycle.as_slice(), &expected.observations());
        }
        assert_ne!(cycles[0], cycles[1]);
    }

    #[test]
    fn second_invocation_within_quiescent_period_is_throttled() {
        let mut poller = poller(
            MockBus::with_frames([[0; 6], [0; 6]]),
            Duration::from_secs(5),
        );
        let mut sink: Vec<Observation> = Vec::new();

        assert!(matches!(
            block_on(poller.poll(&mut sink)),
            Ok(PollOutcome::Observed(_))
        ));
        let outcome = block_on(poller.poll(&mut sink)).unwrap();
        let PollOutcome::Throttled { remaining } = outcome else {
            panic!("expected throttling, got {outcome:?}");
        };
        assert!(remaining <= Duration::from_secs(5));
        assert_eq!(bus(&poller).reads(), 1);
        assert_eq!(bus(&poller).writes(), 1);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn write_failure_emits_nothing() {
        let mut mock = MockBus::with_frames([[0; 6]]);
        mock.fail_write = Some(NACK);
        let mut poller = poller(mock, Duration::from_secs(5));
        let mut sink: Vec<Observation> = Vec::new();

        assert_eq!(block_on(poller.poll(&mut sink)), Err(Error::Io(NACK)));
        assert!(sink.is_empty());
        assert_eq!(bus(&poller).reads(), 0);
    }

    #[test]
    fn read_failure_emits_nothing_and_does_not_arm_throttle() {
        let mut mock = MockBus::default();
        mock.fail_read = Some(ErrorKind::Bus);
        let mut poller = poller(mock, Duration::from_secs(5));
        let mut sink: Vec<Observation> = Vec::new();

        assert_eq!(block_on(poller.poll(&mut sink)), Err(Error::Io(ErrorKind::Bus)));
        assert!(sink.is_empty());
        assert!(poller.throttle().last_read().is_none());

        assert_eq!(block_on(poller.poll(&mut sink)), Err(Error::Io(ErrorKind::Bus)));
        assert_eq!(bus(&poller).writes(), 2);
    }

    #[test]
    fn setup_leaves_the_bus_idle() {
        let mut poller = poller(MockBus::default(), Duration::from_secs(5));
        assert_eq!(block_on(poller.setup()), Ok(()));
        assert!(bus(&poller).events.is_empty());
        assert!(poller.throttle().last_read().is_none());
    }

    #[test]
    fn close_releases_transport() {
        let mut poller = poller(MockBus::default(), Duration::from_secs(5));
        poller.close();
        poller.close();
        assert!(!poller.sensor().transport().is_open());
        assert_eq!(block_on(poller.poll(&mut Vec::<Observation>::new())), Err(Error::Closed));
    }
}
