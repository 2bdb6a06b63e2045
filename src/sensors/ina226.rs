//! INA226 bus-voltage / shunt-current monitor.
//!
//! Configuration and calibration are written once per test in `prepare`.
//! The health check confirms the manufacturer ID and then reads shunt,
//! bus, power and current registers; all of them must succeed.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::BusChannel;
use crate::config::CurrentConfig;
use crate::diagnostics::{HealthResult, SensorDiagnostic};
use crate::error::SensorFault;

use super::read_u16_be;

pub const DEFAULT_ADDRESS: u8 = 0x40;

/// "TI" in ASCII.
pub const MANUFACTURER_TI: u16 = 0x5449;

const REG_CONFIG: u8 = 0x00;
const REG_SHUNT_VOLTAGE: u8 = 0x01;
const REG_BUS_VOLTAGE: u8 = 0x02;
const REG_POWER: u8 = 0x03;
const REG_CURRENT: u8 = 0x04;
const REG_CALIBRATION: u8 = 0x05;
const REG_MANUFACTURER_ID: u8 = 0xFE;

const BUS_LSB_V: f32 = 0.001_25;
const SHUNT_LSB_MV: f32 = 0.002_5;
const POWER_LSB_FACTOR: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    pub bus_volts: f32,
    pub shunt_millivolts: f32,
    pub current_amps: f32,
    pub power_watts: f32,
}

pub struct Ina226 {
    address: u8,
    config: CurrentConfig,
}

impl Ina226 {
    pub fn new(config: CurrentConfig) -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            config,
        }
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Write configuration and calibration registers.
    pub fn configure(&self, bus: &mut dyn BusChannel) -> Result<(), SensorFault> {
        bus.write(
            self.address,
            REG_CONFIG,
            &self.config.config_register.to_be_bytes(),
        )?;
        bus.write(
            self.address,
            REG_CALIBRATION,
            &self.config.calibration_register.to_be_bytes(),
        )?;
        Ok(())
    }

    pub fn identify(&self, bus: &mut dyn BusChannel) -> Result<(), SensorFault> {
        let id = read_u16_be(bus, self.address, REG_MANUFACTURER_ID)?;
        if id != MANUFACTURER_TI {
            warn!("ina226: unexpected manufacturer id 0x{:04X}", id);
            return Err(SensorFault::InvalidReading("manufacturer id"));
        }
        Ok(())
    }

    pub fn read(&self, bus: &mut dyn BusChannel) -> Result<PowerReading, SensorFault> {
        // Shunt and current are two's complement; 0xFFFF is -1 LSB there.
        let shunt = read_u16_be(bus, self.address, REG_SHUNT_VOLTAGE)?;
        let bus_v = self.unsigned_register(bus, REG_BUS_VOLTAGE)?;
        let power = self.unsigned_register(bus, REG_POWER)?;
        let current = read_u16_be(bus, self.address, REG_CURRENT)?;

        let lsb = self.config.current_lsb_a;
        Ok(PowerReading {
            bus_volts: f32::from(bus_v) * BUS_LSB_V,
            shunt_millivolts: f32::from(shunt as i16) * SHUNT_LSB_MV,
            current_amps: f32::from(current as i16) * lsb,
            power_watts: f32::from(power) * POWER_LSB_FACTOR * lsb,
        })
    }

    /// An all-ones unsigned word means nothing drove the bus.
    fn unsigned_register(
        &self,
        bus: &mut dyn BusChannel,
        register: u8,
    ) -> Result<u16, SensorFault> {
        match read_u16_be(bus, self.address, register)? {
            0xFFFF => Err(SensorFault::InvalidReading("all-ones register")),
            raw => Ok(raw),
        }
    }
}

impl SensorDiagnostic for Ina226 {
    fn name(&self) -> &'static str {
        "INA226 current sensor"
    }

    fn prepare(
        &mut self,
        bus: &mut dyn BusChannel,
        _delay: &mut dyn DelayNs,
    ) -> Result<(), SensorFault> {
        self.configure(bus)
    }

    fn check_health(&mut self, bus: &mut dyn BusChannel, _delay: &mut dyn DelayNs) -> HealthResult {
        let outcome = self.identify(bus).and_then(|()| self.read(bus));
        match &outcome {
            Ok(r) => info!(
                "ina226: bus {:.3} V, shunt {:.3} mV, current {:.4} A, power {:.3} W",
                r.bus_volts, r.shunt_millivolts, r.current_amps, r.power_watts
            ),
            Err(e) => warn!("ina226: {}", e),
        }
        HealthResult::from_outcome(&outcome)
    }
}
