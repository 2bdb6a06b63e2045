//! Health-check abstraction shared by every subsystem the jig validates.
//!
//! Each diagnostic answers one question, "is this subsystem healthy?",
//! through [`SensorDiagnostic::check_health`]. The orchestrator dispatches
//! through the trait without caring which sensor is behind it:
//!
//! | Diagnostic                 | Module                          | Bus |
//! |----------------------------|---------------------------------|-----|
//! | INA226 current sensor      | `sensors::ina226`               | yes |
//! | SCD41 CO2 sensor           | `sensors::scd41`                | yes |
//! | TSL2591 + BME280 pair      | `sensors::light_env`            | yes |
//! | Wiring harness             | `diagnostics::continuity`       | no  |
//!
//! An unhealthy result is a normal outcome, never an error that aborts the
//! cycle.

pub mod continuity;
pub mod retry;

use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::app::ports::BusChannel;
use crate::error::{SensorFault, WiringFault};

/// Coarse classification of why a check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhealthyReason {
    /// Bus transaction failed after every allowed retry.
    CommunicationFailure,
    /// Sentinel, CRC-mismatched or out-of-range value.
    InvalidReading,
    /// A channel or line could not be driven or sampled.
    MissingChannel,
    /// Harness has open and/or crossed lines.
    Wiring(WiringFault),
}

impl From<SensorFault> for UnhealthyReason {
    fn from(fault: SensorFault) -> Self {
        match fault {
            SensorFault::Communication(_) => Self::CommunicationFailure,
            SensorFault::InvalidReading(_) => Self::InvalidReading,
            SensorFault::MissingChannel(_) => Self::MissingChannel,
        }
    }
}

impl From<WiringFault> for UnhealthyReason {
    fn from(fault: WiringFault) -> Self {
        Self::Wiring(fault)
    }
}

impl fmt::Display for UnhealthyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommunicationFailure => write!(f, "communication failure"),
            Self::InvalidReading => write!(f, "invalid reading"),
            Self::MissingChannel => write!(f, "missing channel"),
            Self::Wiring(w) => write!(f, "wiring fault: {w}"),
        }
    }
}

/// Outcome of one health check. All or nothing: a check that could not
/// complete every sub-reading is `Unhealthy`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthResult {
    Healthy,
    Unhealthy(UnhealthyReason),
}

impl HealthResult {
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Collapse a sub-reading outcome into a health result.
    pub fn from_outcome<T>(outcome: &Result<T, SensorFault>) -> Self {
        match outcome {
            Ok(_) => Self::Healthy,
            Err(fault) => Self::Unhealthy((*fault).into()),
        }
    }

    /// First unhealthy result wins; both must be healthy to stay healthy.
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::Healthy => other,
            unhealthy => unhealthy,
        }
    }
}

/// How many times the orchestrator polls a diagnostic, and how long it
/// waits between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPlan {
    pub attempts: u8,
    pub interval_ms: u32,
}

impl PollPlan {
    /// A single poll; the result is final.
    pub const ONCE: Self = Self {
        attempts: 1,
        interval_ms: 0,
    };
}

/// Uniform health-check capability.
///
/// Only [`check_health`](Self::check_health) is required. The hooks run
/// around the poll loop: `prepare` once before the first poll (with any
/// settle time it needs), `finish` once after the last.
pub trait SensorDiagnostic {
    /// Human-readable name for logs.
    fn name(&self) -> &'static str {
        "diagnostic"
    }

    /// Start-of-measurement action. A failure here makes the test fail
    /// without polling.
    fn prepare(
        &mut self,
        _bus: &mut dyn BusChannel,
        _delay: &mut dyn DelayNs,
    ) -> Result<(), SensorFault> {
        Ok(())
    }

    /// Perform the minimal operational read and validate it.
    fn check_health(&mut self, bus: &mut dyn BusChannel, delay: &mut dyn DelayNs) -> HealthResult;

    /// Return the device to a state from which `prepare` can run again.
    fn finish(
        &mut self,
        _bus: &mut dyn BusChannel,
        _delay: &mut dyn DelayNs,
    ) -> Result<(), SensorFault> {
        Ok(())
    }

    fn poll_plan(&self) -> PollPlan {
        PollPlan::ONCE
    }
}
