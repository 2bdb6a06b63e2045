//! SCD41 photoacoustic CO2 sensor (Sensirion command protocol).
//!
//! ```text
//!   prepare       start_periodic_measurement (0x21B1) ─ settle 5 s
//!   check_health  read_measurement (0xEC05) ─ settle ─ 9-byte frame
//!   finish        stop_periodic_measurement (0x3F86) ─ settle 500 ms
//! ```
//!
//! Commands are 16-bit big-endian words with no register prefix. The
//! response frame is three words, each followed by its CRC-8. The sensor
//! NACKs a start while already measuring, so `finish` always stops it.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::BusChannel;
use crate::config::{BusConfig, Co2Config};
use crate::diagnostics::retry::{RetryBudget, with_retry};
use crate::diagnostics::{HealthResult, PollPlan, SensorDiagnostic};
use crate::error::SensorFault;

use super::sensirion_crc8;

pub const DEFAULT_ADDRESS: u8 = 0x62;

pub const CMD_START_PERIODIC: u16 = 0x21B1;
pub const CMD_STOP_PERIODIC: u16 = 0x3F86;
pub const CMD_READ_MEASUREMENT: u16 = 0xEC05;

const FRAME_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Co2Reading {
    pub co2_ppm: u16,
    pub celsius: f32,
    pub humidity_pct: f32,
}

pub struct Scd41 {
    address: u8,
    schedule: Co2Config,
    command_retry: RetryBudget,
    response_retry: RetryBudget,
}

impl Scd41 {
    pub fn new(bus: &BusConfig, schedule: Co2Config) -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            schedule,
            command_retry: bus.command_retry,
            response_retry: bus.response_retry,
        }
    }

    pub fn start_periodic_measurement(
        &self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
    ) -> Result<(), SensorFault> {
        info!("scd41: starting periodic measurement");
        self.send_command(bus, delay, CMD_START_PERIODIC)?;
        delay.delay_ms(self.schedule.start_settle_ms);
        Ok(())
    }

    pub fn stop_periodic_measurement(
        &self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
    ) -> Result<(), SensorFault> {
        info!("scd41: stopping periodic measurement");
        self.send_command(bus, delay, CMD_STOP_PERIODIC)?;
        delay.delay_ms(self.schedule.stop_settle_ms);
        Ok(())
    }

    pub fn read_measurement(
        &self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
    ) -> Result<Co2Reading, SensorFault> {
        self.send_command(bus, delay, CMD_READ_MEASUREMENT)?;
        delay.delay_ms(self.schedule.read_settle_ms);

        let address = self.address;
        let frame = with_retry(self.response_retry, delay, |_| {
            let mut frame = [0u8; FRAME_LEN];
            bus.receive(address, &mut frame)?;
            Ok(frame)
        })?;
        decode_frame(&frame)
    }

    fn send_command(
        &self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
        command: u16,
    ) -> Result<(), SensorFault> {
        let address = self.address;
        with_retry(self.command_retry, delay, |_| {
            bus.send(address, &command.to_be_bytes())?;
            Ok(())
        })
    }
}

/// Validate and convert one read-measurement response.
pub fn decode_frame(frame: &[u8; FRAME_LEN]) -> Result<Co2Reading, SensorFault> {
    let mut words = [0u16; 3];
    for (word, chunk) in words.iter_mut().zip(frame.chunks_exact(3)) {
        if sensirion_crc8(&chunk[..2]) != chunk[2] {
            return Err(SensorFault::InvalidReading("crc mismatch"));
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        if *word == 0xFFFF {
            return Err(SensorFault::InvalidReading("all-ones word"));
        }
    }

    Ok(Co2Reading {
        co2_ppm: words[0],
        celsius: -45.0 + 175.0 * f32::from(words[1]) / 65536.0,
        humidity_pct: 100.0 * f32::from(words[2]) / 65536.0,
    })
}

impl SensorDiagnostic for Scd41 {
    fn name(&self) -> &'static str {
        "SCD41 CO2 sensor"
    }

    fn prepare(
        &mut self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
    ) -> Result<(), SensorFault> {
        self.start_periodic_measurement(bus, delay)
    }

    fn check_health(&mut self, bus: &mut dyn BusChannel, delay: &mut dyn DelayNs) -> HealthResult {
        let outcome = self.read_measurement(bus, delay);
        match &outcome {
            Ok(r) => info!(
                "scd41: CO2 {} ppm, {:.2} C, {:.2} %RH",
                r.co2_ppm, r.celsius, r.humidity_pct
            ),
            Err(e) => warn!("scd41: {}", e),
        }
        HealthResult::from_outcome(&outcome)
    }

    fn finish(
        &mut self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
    ) -> Result<(), SensorFault> {
        self.stop_periodic_measurement(bus, delay)
    }

    fn poll_plan(&self) -> PollPlan {
        PollPlan {
            attempts: self.schedule.poll_attempts,
            interval_ms: self.schedule.poll_interval_ms,
        }
    }
}
