use embassy_time::{Duration, Instant};

/// Settling time between two single-shot reads
pub const DEFAULT_QUIESCENT_PERIOD: Duration = Duration::from_secs(5);

/// Gate deciding whether a hardware read may start at `now`.
///
/// A read is allowed when none has completed yet, or when at least
/// `quiescent` has passed since the last one completed. A `now` earlier than
/// `last_read` counts as no time elapsed.
#[must_use]
pub fn should_read(last_read: Option<Instant>, now: Instant, quiescent: Duration) -> bool {
    match last_read {
        None => true,
        Some(last) => now.saturating_duration_since(last) >= quiescent,
    }
}

/// Quiescent-period bookkeeping for one sensor
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    quiescent: Duration,
    last_read: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub const fn new(quiescent: Duration) -> Self {
        Self {
            quiescent,
            last_read: None,
        }
    }

    #[must_use]
    pub const fn quiescent(&self) -> Duration {
        self.quiescent
    }

    /// Completion time of the last successful read
    #[must_use]
    pub const fn last_read(&self) -> Option<Instant> {
        self.last_read
    }

    #[must_use]
    pub fn ready(&self, now: Instant) -> bool {
        should_read(self.last_read, now, self.quiescent)
    }

    /// Time left before [`Throttle::ready`] turns true
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.last_read.map_or(Duration::from_ticks(0), |last| {
            self.quiescent
                .checked_sub(now.saturating_duration_since(last))
                .unwrap_or(Duration::from_ticks(0))
        })
    }

    /// Record a successful read completing at `at`
    pub const fn mark(&mut self, at: Instant) {
        self.last_read = Some(at);
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_QUIESCENT_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIESCENT: Duration = Duration::from_secs(5);

    #[test]
    fn first_read_is_always_allowed() {
        assert!(should_read(None, Instant::from_secs(0), QUIESCENT));
        assert!(should_read(None, Instant::from_secs(1_000), QUIESCENT));
    }

    #[test]
    fn blocks_until_quiescent_period_elapsed() {
        let last = Some(Instant::from_secs(100));
        assert!(!should_read(last, Instant::from_secs(100), QUIESCENT));
        assert!(!should_read(last, Instant::from_millis(104_999), QUIESCENT));
        assert!(should_read(last, Instant::from_secs(105), QUIESCENT));
        assert!(should_read(last, Instant::from_secs(600), QUIESCENT));
    }

    #[test]
    fn clock_behind_last_read_blocks() {
        let last = Some(Instant::from_secs(100));
        assert!(!should_read(last, Instant::from_secs(99), QUIESCENT));
    }

    #[test]
    fn zero_period_never_blocks() {
        let last = Some(Instant::from_secs(100));
        assert!(should_read(last, Instant::from_secs(100), Duration::from_ticks(0)));
    }

    #[test]
    fn throttle_tracks_remaining_time() {
        let mut throttle = Throttle::default();
        assert_eq!(throttle.quiescent(), QUIESCENT);
        assert!(throttle.ready(Instant::from_secs(10)));
        assert_eq!(throttle.remaining(Instant::from_secs(10)), Duration::from_ticks(0));

        throttle.mark(Instant::from_secs(10));
        assert_eq!(throttle.last_read(), Some(Instant::from_secs(10)));
        assert!(!throttle.ready(Instant::from_secs(12)));
        assert_eq!(throttle.remaining(Instant::from_secs(12)), Duration::from_secs(3));
        assert!(throttle.ready(Instant::from_secs(15)));
        assert_eq!(throttle.remaining(Instant::from_secs(20)), Duration::from_ticks(0));
    }
}
