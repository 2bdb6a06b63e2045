//! `BusChannel` over any `embedded-hal` 1.0 I2C bus.
//!
//! Register writes are staged as `[register, bytes..]` in a fixed buffer so
//! they go out as one transaction. Register reads use a write-read with a
//! repeated start.

use embedded_hal::i2c::{self, I2c};

use crate::app::ports::BusChannel;
use crate::error::BusError;

/// Largest register payload the staging buffer accepts.
pub const MAX_PAYLOAD: usize = 16;

fn map_error<E: i2c::Error>(err: E) -> BusError {
    match err.kind() {
        i2c::ErrorKind::NoAcknowledge(_) => BusError::Nack,
        i2c::ErrorKind::ArbitrationLoss => BusError::ArbitrationLoss,
        i2c::ErrorKind::Bus => BusError::Bus,
        i2c::ErrorKind::Overrun => BusError::Overrun,
        _ => BusError::Other,
    }
}

pub struct I2cBus<I> {
    i2c: I,
}

impl<I: I2c> I2cBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> BusChannel for I2cBus<I> {
    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), BusError> {
        if bytes.len() > MAX_PAYLOAD {
            return Err(BusError::PayloadTooLong);
        }
        let mut staged = [0u8; MAX_PAYLOAD + 1];
        staged[0] = register;
        staged[1..=bytes.len()].copy_from_slice(bytes);
        self.i2c
            .write(address, &staged[..=bytes.len()])
            .map_err(map_error)
    }

    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c.write_read(address, &[register], buf).map_err(map_error)
    }

    fn send(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.i2c.write(address, bytes).map_err(map_error)
    }

    fn receive(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c.read(address, buf).map_err(map_error)
    }
}
