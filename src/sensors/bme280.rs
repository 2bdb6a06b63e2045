//! BME280 temperature / pressure / humidity sensor.
//!
//! Runs a single forced-mode conversion per reading and applies the
//! datasheet's floating-point compensation. A raw value equal to the
//! "measurement skipped" sentinel means the conversion never ran.
//!
//! Trimming values are factory-programmed per part and the module under
//! test changes between cycles, so every reading reloads them.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::BusChannel;
use crate::error::SensorFault;

pub const DEFAULT_ADDRESS: u8 = 0x76;
pub const CHIP_ID: u8 = 0x60;

const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIB_TP: u8 = 0x88;
const REG_CALIB_H: u8 = 0xE1;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_DATA: u8 = 0xF7;

/// Humidity oversampling x1.
const CTRL_HUM: u8 = 0x01;
/// Temperature x1, pressure x1, forced mode.
const CTRL_MEAS: u8 = 0x25;
/// Worst case for x1/x1/x1 is under 10 ms.
const CONVERSION_MS: u32 = 10;

const SKIPPED_20BIT: u32 = 0x80000;
const SKIPPED_16BIT: u32 = 0x8000;

const PASCALS_PER_ATM: f64 = 101_325.0;

/// Factory trimming parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

impl Calibration {
    /// Parse the 0x88 (26 bytes) and 0xE1 (7 bytes) blocks.
    pub fn parse(tp: &[u8; 26], h: &[u8; 7]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([tp[i], tp[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([tp[i], tp[i + 1]]);
        Self {
            t1: u16_at(0),
            t2: i16_at(2),
            t3: i16_at(4),
            p1: u16_at(6),
            p2: i16_at(8),
            p3: i16_at(10),
            p4: i16_at(12),
            p5: i16_at(14),
            p6: i16_at(16),
            p7: i16_at(18),
            p8: i16_at(20),
            p9: i16_at(22),
            h1: tp[25],
            h2: i16::from_le_bytes([h[0], h[1]]),
            h3: h[2],
            h4: (i16::from(h[3] as i8) << 4) | i16::from(h[4] & 0x0F),
            h5: (i16::from(h[5] as i8) << 4) | i16::from(h[4] >> 4),
            h6: h[6] as i8,
        }
    }
}

/// Uncompensated ADC values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub pressure: u32,
    pub temperature: u32,
    pub humidity: u32,
}

impl RawSample {
    pub fn parse(data: &[u8; 8]) -> Self {
        let adc20 = |i: usize| {
            (u32::from(data[i]) << 12) | (u32::from(data[i + 1]) << 4) | (u32::from(data[i + 2]) >> 4)
        };
        Self {
            pressure: adc20(0),
            temperature: adc20(3),
            humidity: (u32::from(data[6]) << 8) | u32::from(data[7]),
        }
    }

    pub fn validate(&self) -> Result<(), SensorFault> {
        if self.temperature == SKIPPED_20BIT
            || self.pressure == SKIPPED_20BIT
            || self.humidity == SKIPPED_16BIT
        {
            return Err(SensorFault::InvalidReading("skipped measurement"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentReading {
    pub celsius: f64,
    pub pressure_atm: f64,
    pub humidity_pct: f64,
}

/// Temperature in degrees C plus the shared `t_fine` term.
pub fn compensate_temperature(cal: &Calibration, adc_t: u32) -> (f64, f64) {
    let adc_t = f64::from(adc_t);
    let t1 = f64::from(cal.t1);
    let var1 = (adc_t / 16_384.0 - t1 / 1024.0) * f64::from(cal.t2);
    let d = adc_t / 131_072.0 - t1 / 8192.0;
    let var2 = d * d * f64::from(cal.t3);
    let t_fine = var1 + var2;
    (t_fine / 5120.0, t_fine)
}

/// Pressure in pascals.
pub fn compensate_pressure(cal: &Calibration, adc_p: u32, t_fine: f64) -> f64 {
    let mut var1 = t_fine / 2.0 - 64_000.0;
    let mut var2 = var1 * var1 * f64::from(cal.p6) / 32_768.0;
    var2 += var1 * f64::from(cal.p5) * 2.0;
    var2 = var2 / 4.0 + f64::from(cal.p4) * 65_536.0;
    var1 = (f64::from(cal.p3) * var1 * var1 / 524_288.0 + f64::from(cal.p2) * var1) / 524_288.0;
    var1 = (1.0 + var1 / 32_768.0) * f64::from(cal.p1);
    if var1 == 0.0 {
        return 0.0;
    }
    let mut p = 1_048_576.0 - f64::from(adc_p);
    p = (p - var2 / 4096.0) * 6250.0 / var1;
    let var1 = f64::from(cal.p9) * p * p / 2_147_483_648.0;
    let var2 = p * f64::from(cal.p8) / 32_768.0;
    p + (var1 + var2 + f64::from(cal.p7)) / 16.0
}

/// Relative humidity in percent, clamped to 0..=100.
pub fn compensate_humidity(cal: &Calibration, adc_h: u32, t_fine: f64) -> f64 {
    let mut h = t_fine - 76_800.0;
    h = (f64::from(adc_h) - (f64::from(cal.h4) * 64.0 + f64::from(cal.h5) / 16_384.0 * h))
        * (f64::from(cal.h2) / 65_536.0
            * (1.0
                + f64::from(cal.h6) / 67_108_864.0
                    * h
                    * (1.0 + f64::from(cal.h3) / 67_108_864.0 * h)));
    h *= 1.0 - f64::from(cal.h1) * h / 524_288.0;
    h.clamp(0.0, 100.0)
}

pub struct Bme280 {
    address: u8,
}

impl Default for Bme280 {
    fn default() -> Self {
        Self::new()
    }
}

impl Bme280 {
    pub fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
        }
    }

    pub fn read(
        &self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
    ) -> Result<EnvironmentReading, SensorFault> {
        let mut id = [0u8; 1];
        bus.read(self.address, REG_CHIP_ID, &mut id)?;
        if id[0] != CHIP_ID {
            warn!("bme280: unexpected chip id 0x{:02X}", id[0]);
            return Err(SensorFault::InvalidReading("chip id"));
        }

        let cal = self.load_calibration(bus)?;

        // ctrl_hum only latches on the following ctrl_meas write.
        bus.write(self.address, REG_CTRL_HUM, &[CTRL_HUM])?;
        bus.write(self.address, REG_CTRL_MEAS, &[CTRL_MEAS])?;
        delay.delay_ms(CONVERSION_MS);

        let mut data = [0u8; 8];
        bus.read(self.address, REG_DATA, &mut data)?;
        let raw = RawSample::parse(&data);
        raw.validate()?;

        let (celsius, t_fine) = compensate_temperature(&cal, raw.temperature);
        let reading = EnvironmentReading {
            celsius,
            pressure_atm: compensate_pressure(&cal, raw.pressure, t_fine) / PASCALS_PER_ATM,
            humidity_pct: compensate_humidity(&cal, raw.humidity, t_fine),
        };
        info!(
            "bme280: {:.2} C, {:.2} atm, {:.2} %RH",
            reading.celsius, reading.pressure_atm, reading.humidity_pct
        );
        Ok(reading)
    }

    fn load_calibration(&self, bus: &mut dyn BusChannel) -> Result<Calibration, SensorFault> {
        let mut tp = [0u8; 26];
        let mut h = [0u8; 7];
        bus.read(self.address, REG_CALIB_TP, &mut tp)?;
        bus.read(self.address, REG_CALIB_H, &mut h)?;
        Ok(Calibration::parse(&tp, &h))
    }
}
