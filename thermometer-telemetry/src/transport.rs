//! Exclusive byte-level access to one device on a two-wire bus.
//!
//! The transport owns the bus handle for its whole lifetime. It performs no
//! retries and no framing; both belong to the driver above it.

use crate::Error;
use embedded_hal_async::i2c::I2c;
use log::debug;

/// One addressed device on an I2C bus
pub struct I2cTransport<BUS> {
    bus: Option<BUS>,
    address: u8,
}

impl<BUS> I2cTransport<BUS> {
    /// Take ownership of an already opened bus
    #[must_use]
    pub const fn new(bus: BUS, address: u8) -> Self {
        Self {
            bus: Some(bus),
            address,
        }
    }

    /// 7-bit device address
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.bus.is_some()
    }

    /// Borrow the underlying bus, if still open
    #[must_use]
    pub const fn bus(&self) -> Option<&BUS> {
        self.bus.as_ref()
    }

    /// Release the bus handle.
    ///
    /// Returns the handle on the first call and `None` on every call after
    /// that, so it is safe to call from a shutdown path that does not know
    /// whether a read already failed and closed it.
    pub fn close(&mut self) -> Option<BUS> {
        let bus = self.bus.take();
        if bus.is_some() {
            debug!("released i2c device {:#04x}", self.address);
        }
        bus
    }
}

impl<BUS: I2c> I2cTransport<BUS> {
    /// Write `buf` to the device in a single transfer
    ///
    /// # Errors
    /// * [`Error::Io`] on NACK or a short write
    /// * [`Error::Closed`] if the transport was closed
    pub async fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, Error<BUS::Error>> {
        let bus = self.bus.as_mut().ok_or(Error::Closed)?;
        bus.write(self.address, buf).await.map_err(Error::Io)?;
        debug!("wrote {} bytes to i2c device {:#04x}", buf.len(), self.address);
        Ok(buf.len())
    }

    /// Read exactly `N` bytes from the device
    ///
    /// # Errors
    /// * [`Error::Io`] on a short read or bus timeout
    /// * [`Error::Closed`] if the transport was closed
    pub async fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], Error<BUS::Error>> {
        let bus = self.bus.as_mut().ok_or(Error::Closed)?;
        let mut buf = [0u8; N];
        bus.read(self.address, &mut buf).await.map_err(Error::Io)?;
        debug!("{} bytes read from i2c device {:#04x}", N, self.address);
        Ok(buf)
    }
}
