use alloc::vec::Vec;
use core::fmt;

/// Kind of value carried by an [`Observation`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadType {
    Temperature,
    Humidity,
}

impl ReadType {
    /// Tag attached to the exported gauge sample
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "temperature (F)",
            Self::Humidity => "humidity (RH)",
        }
    }
}

impl fmt::Display for ReadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An instantaneous scalar sample tagged by reading type
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub value: f64,
    pub read_type: ReadType,
}

impl Observation {
    #[must_use]
    pub const fn new(value: f64, read_type: ReadType) -> Self {
        Self { value, read_type }
    }
}

/// Destination for observations emitted by the poller
///
/// # Side-effects
/// * Implementations typically update a gauge in a metrics registry
pub trait ObservationSink {
    fn observe(&mut self, observation: Observation);
}

impl ObservationSink for Vec<Observation> {
    fn observe(&mut self, observation: Observation) {
        self.push(observation);
    }
}

impl<T: ObservationSink + ?Sized> ObservationSink for &mut T {
    fn observe(&mut self, observation: Observation) {
        (**self).observe(observation);
    }
}
