//! Scripted I2C bus for exercising the transport, driver and poller
//! without hardware.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
use embedded_hal_async::i2c::I2c;

/// Bus traffic as seen by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write(u8, Vec<u8>),
    Read(u8, usize),
}

#[derive(Default)]
pub struct MockBus {
    pub events: Vec<Event>,
    pub frames: VecDeque<[u8; 6]>,
    pub fail_write: Option<ErrorKind>,
    pub fail_read: Option<ErrorKind>,
}

impl MockBus {
    pub fn with_frames<I: IntoIterator<Item = [u8; 6]>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Write(..)))
            .count()
    }

    pub fn reads(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Read(..)))
            .count()
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    if let Some(err) = self.fail_write {
                        return Err(err);
                    }
                    self.events.push(Event::Write(address, bytes.to_vec()));
                }
                Operation::Read(buf) => {
                    if let Some(err) = self.fail_read {
                        return Err(err);
                    }
                    let frame = self.frames.pop_front().ok_or(ErrorKind::Other)?;
                    let len = buf.len().min(frame.len());
                    buf[..len].copy_from_slice(&frame[..len]);
                    self.events.push(Event::Read(address, buf.len()));
                }
            }
        }
        Ok(())
    }
}
