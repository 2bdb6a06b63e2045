//! TSL2591 dual-channel ambient light sensor.
//!
//! Every register access carries the command bit (0xA0). One reading is a
//! full power cycle: enable, program timing and gain, wait one integration
//! period plus margin, read both channels, power down.

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::BusChannel;
use crate::config::LightConfig;
use crate::error::SensorFault;

use super::read_u16_le;

pub const DEFAULT_ADDRESS: u8 = 0x29;

const COMMAND_BIT: u8 = 0xA0;
const REG_ENABLE: u8 = 0x00;
const REG_CONTROL: u8 = 0x01;
const REG_CHAN0_LOW: u8 = 0x14;
const REG_CHAN1_LOW: u8 = 0x16;

const ENABLE_POWEROFF: u8 = 0x00;
const ENABLE_POWERON: u8 = 0x01;
const ENABLE_AEN: u8 = 0x02;
const ENABLE_AIEN: u8 = 0x10;

/// Extra wait after the nominal integration period.
const INTEGRATION_MARGIN_MS: u32 = 20;

const LUX_DF: f32 = 408.0;
const LUX_COEFB: f32 = 1.64;
const LUX_COEFC: f32 = 0.59;
const LUX_COEFD: f32 = 0.86;

/// ADC saturation marker.
const SATURATED: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationTime {
    Ms100,
    Ms200,
    Ms300,
    Ms400,
    Ms500,
    Ms600,
}

impl IntegrationTime {
    pub const fn bits(self) -> u8 {
        match self {
            Self::Ms100 => 0x00,
            Self::Ms200 => 0x01,
            Self::Ms300 => 0x02,
            Self::Ms400 => 0x03,
            Self::Ms500 => 0x04,
            Self::Ms600 => 0x05,
        }
    }

    pub const fn millis(self) -> u32 {
        (self.bits() as u32 + 1) * 100
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gain {
    Low,
    Medium,
    High,
    Max,
}

impl Gain {
    pub const fn bits(self) -> u8 {
        match self {
            Self::Low => 0x00,
            Self::Medium => 0x10,
            Self::High => 0x20,
            Self::Max => 0x30,
        }
    }

    pub const fn factor(self) -> f32 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 25.0,
            Self::High => 428.0,
            Self::Max => 9876.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightReading {
    /// Channel 0, visible plus infrared.
    pub full: u16,
    /// Channel 1, infrared only.
    pub ir: u16,
    pub lux: f32,
}

impl LightReading {
    pub fn visible(&self) -> u16 {
        self.full.saturating_sub(self.ir)
    }
}

/// Convert raw channel counts to lux. Saturated input yields 0.
pub fn calculate_lux(full: u16, ir: u16, integration: IntegrationTime, gain: Gain) -> f32 {
    if full == SATURATED || ir == SATURATED {
        return 0.0;
    }
    let full = f32::from(full);
    let ir = f32::from(ir);
    let cpl = integration.millis() as f32 * gain.factor() / LUX_DF;
    let lux1 = (full - LUX_COEFB * ir) / cpl;
    let lux2 = (LUX_COEFC * full - LUX_COEFD * ir) / cpl;
    lux1.max(lux2)
}

pub struct Tsl2591 {
    address: u8,
    settings: LightConfig,
}

impl Tsl2591 {
    pub fn new(settings: LightConfig) -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            settings,
        }
    }

    /// One complete power-up / integrate / read / power-down cycle.
    ///
    /// The sensor is powered down even when a channel read fails.
    pub fn read(
        &self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
    ) -> Result<LightReading, SensorFault> {
        self.write_register(bus, REG_ENABLE, ENABLE_POWERON | ENABLE_AEN | ENABLE_AIEN)?;
        let control = self.settings.integration.bits() | self.settings.gain.bits();
        self.write_register(bus, REG_CONTROL, control)?;
        delay.delay_ms(self.settings.integration.millis() + INTEGRATION_MARGIN_MS);

        let channels = read_u16_le(bus, self.address, COMMAND_BIT | REG_CHAN0_LOW).and_then(
            |full| read_u16_le(bus, self.address, COMMAND_BIT | REG_CHAN1_LOW).map(|ir| (full, ir)),
        );
        let powered_down = self.write_register(bus, REG_ENABLE, ENABLE_POWEROFF);
        let (full, ir) = channels?;
        powered_down?;

        if full == SATURATED || ir == SATURATED {
            warn!("tsl2591: saturated channel (full=0x{:04X}, ir=0x{:04X})", full, ir);
            return Err(SensorFault::InvalidReading("saturated channel"));
        }

        let reading = LightReading {
            full,
            ir,
            lux: calculate_lux(full, ir, self.settings.integration, self.settings.gain),
        };
        info!(
            "tsl2591: full {} ir {} visible {} ({:.2} lux)",
            reading.full,
            reading.ir,
            reading.visible(),
            reading.lux
        );
        Ok(reading)
    }

    fn write_register(
        &self,
        bus: &mut dyn BusChannel,
        register: u8,
        value: u8,
    ) -> Result<(), SensorFault> {
        bus.write(self.address, COMMAND_BIT | register, &[value])?;
        Ok(())
    }
}
