use crate::ReadType;
use thiserror::Error;

/// Failures of the sensor pipeline, generic over the bus error `E`.
///
/// Nothing below the caller retries or swallows these; the binary decides
/// which of them terminate the process.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus or the device node could not be opened
    #[error("sensor bus unavailable: {0:?}")]
    TransportUnavailable(E),
    /// A write or read failed mid-operation (NACK, short transfer, timeout)
    #[error("sensor bus i/o failure: {0:?}")]
    Io(E),
    /// The device answered with a frame of the wrong size
    #[error("malformed sensor frame: expected {expected} bytes, got {actual}")]
    ProtocolViolation { expected: usize, actual: usize },
    /// A channel checksum did not match its data bytes
    #[error("{channel} checksum mismatch: frame carries {expected:#04x}, computed {actual:#04x}")]
    Crc {
        channel: ReadType,
        expected: u8,
        actual: u8,
    },
    /// The transport was already closed
    #[error("sensor transport is closed")]
    Closed,
}

impl<E> Error<E> {
    /// Stable label for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TransportUnavailable(_) => "transport_unavailable",
            Self::Io(_) => "io",
            Self::ProtocolViolation { .. } => "protocol_violation",
            Self::Crc { .. } => "crc",
            Self::Closed => "closed",
        }
    }

    /// Whether a later cycle could plausibly succeed without intervention
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Crc { .. })
    }
}
