//! Jig configuration parameters
//!
//! Every hardware-tuned constant of the jig: debounce and settle times,
//! retry budgets, CO2 polling schedule and sensor register settings.
//! `Default` holds the values of the reference jig; a JSON override can be
//! parsed with [`JigConfig::from_json`] and is checked by
//! [`JigConfig::validate`] before use.

use serde::{Deserialize, Serialize};

use crate::diagnostics::retry::RetryBudget;
use crate::error::{Error, Result};
use crate::sensors::tsl2591::{Gain, IntegrationTime};

/// Core jig configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JigConfig {
    pub arbiter: ArbiterConfig,
    pub continuity: ContinuityConfig,
    pub bus: BusConfig,
    pub co2: Co2Config,
    pub light: LightConfig,
    pub current: CurrentConfig,
    pub indicator: IndicatorConfig,
}

/// Mode button debouncing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Interval between consecutive samples of one line (milliseconds)
    pub debounce_ms: u32,
    /// Upper bound on samples per line before the line counts as unstable
    pub max_samples: u16,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            max_samples: 40, // 2 s of chatter at 50 ms
        }
    }
}

/// Harness continuity scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuityConfig {
    /// Settle time after every drive-line edge (milliseconds)
    pub settle_ms: u32,
}

impl Default for ContinuityConfig {
    fn default() -> Self {
        Self { settle_ms: 100 }
    }
}

/// Shared I2C bus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub frequency_hz: u32,
    /// Retry budget for command writes to protocol sensors
    pub command_retry: RetryBudget,
    /// Retry budget for multi-byte response reads
    pub response_retry: RetryBudget,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 100_000,
            command_retry: RetryBudget::new(3, 100),
            response_retry: RetryBudget::new(3, 500),
        }
    }
}

/// SCD41 measurement schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Co2Config {
    /// Wait after start-periodic-measurement (milliseconds)
    pub start_settle_ms: u32,
    /// Wait between the read command and fetching the response
    pub read_settle_ms: u32,
    /// Wait after stop-periodic-measurement
    pub stop_settle_ms: u32,
    /// Health polls per CO2 test
    pub poll_attempts: u8,
    /// Delay between health polls
    pub poll_interval_ms: u32,
}

impl Default for Co2Config {
    fn default() -> Self {
        Self {
            start_settle_ms: 5000,
            read_settle_ms: 1000,
            stop_settle_ms: 500,
            poll_attempts: 5,
            poll_interval_ms: 5000,
        }
    }
}

/// TSL2591 settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub integration: IntegrationTime,
    pub gain: Gain,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            integration: IntegrationTime::Ms100,
            gain: Gain::Low,
        }
    }
}

/// INA226 register settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConfig {
    pub config_register: u16,
    pub calibration_register: u16,
    /// Amps per current-register bit, matching the calibration value
    pub current_lsb_a: f32,
}

impl Default for CurrentConfig {
    fn default() -> Self {
        Self {
            config_register: 0x4127,
            calibration_register: 0x2000,
            current_lsb_a: 0.000_1,
        }
    }
}

/// Status indicator and heartbeat animation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Animation tick rate for both LEDs (Hz)
    pub tick_hz: u32,
    /// Duty increment per tick on the 16-bit scale
    pub ramp_step: u16,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            tick_hz: 50,
            ramp_step: 1024,
        }
    }
}

impl JigConfig {
    /// Parse a (possibly partial) JSON override. Missing fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON override"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall the jig or make a test meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.arbiter.debounce_ms == 0 {
            return Err(Error::Config("arbiter.debounce_ms must be > 0"));
        }
        if self.arbiter.max_samples < 2 {
            return Err(Error::Config("arbiter.max_samples must be >= 2"));
        }
        if self.continuity.settle_ms == 0 {
            return Err(Error::Config("continuity.settle_ms must be > 0"));
        }
        if self.bus.frequency_hz == 0 {
            return Err(Error::Config("bus.frequency_hz must be > 0"));
        }
        if self.bus.command_retry.max_attempts == 0 || self.bus.response_retry.max_attempts == 0 {
            return Err(Error::Config("retry budgets need at least one attempt"));
        }
        if self.co2.poll_attempts == 0 {
            return Err(Error::Config("co2.poll_attempts must be > 0"));
        }
        if self.current.current_lsb_a <= 0.0 {
            return Err(Error::Config("current.current_lsb_a must be positive"));
        }
        if self.indicator.tick_hz == 0 || self.indicator.ramp_step == 0 {
            return Err(Error::Config("indicator tick and step must be > 0"));
        }
        Ok(())
    }
}
