//! Sensor drivers for the devices under test.
//!
//! Every driver talks through the [`BusChannel`] port and implements
//! [`SensorDiagnostic`](crate::diagnostics::SensorDiagnostic). Drivers keep
//! no bus handle of their own; the orchestrator lends the shared bus for
//! the duration of one diagnostic.

pub mod bme280;
pub mod ina226;
pub mod light_env;
pub mod scd41;
pub mod tsl2591;

use crate::app::ports::BusChannel;
use crate::error::SensorFault;

/// Read a big-endian 16-bit register.
pub(crate) fn read_u16_be(
    bus: &mut dyn BusChannel,
    address: u8,
    register: u8,
) -> Result<u16, SensorFault> {
    let mut buf = [0u8; 2];
    bus.read(address, register, &mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

/// Read a little-endian 16-bit register.
pub(crate) fn read_u16_le(
    bus: &mut dyn BusChannel,
    address: u8,
    register: u8,
) -> Result<u16, SensorFault> {
    let mut buf = [0u8; 2];
    bus.read(address, register, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Sensirion CRC-8 (polynomial 0x31, init 0xFF, no reflection).
pub fn sensirion_crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}
