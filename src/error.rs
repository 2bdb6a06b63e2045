//! Error types for the test jig firmware.
//!
//! All types are `Copy` so they travel through the arbiter, diagnostics
//! and event sink without allocation. The top-level [`Error`] covers
//! start-up failures outside the test cycle.
//!
//! Only [`ArbitrationFault`] aborts a cycle. Bus, reading and wiring
//! failures are ordinary per-check outcomes and end up inside a
//! [`HealthResult`](crate::diagnostics::HealthResult).

use core::fmt;

use crate::arbiter::Mode;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Failure before the control loop starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// A single bus transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Device did not acknowledge its address or a data byte.
    Nack,
    /// Another controller won arbitration.
    ArbitrationLoss,
    /// Bus-level error (misplaced START/STOP).
    Bus,
    /// Receive buffer overrun.
    Overrun,
    /// Register write payload exceeds the staging buffer.
    PayloadTooLong,
    /// Any other transport failure, including timeouts.
    Other,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge"),
            Self::ArbitrationLoss => write!(f, "arbitration lost"),
            Self::Bus => write!(f, "bus error"),
            Self::Overrun => write!(f, "overrun"),
            Self::PayloadTooLong => write!(f, "payload too long"),
            Self::Other => write!(f, "transaction failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// A bus transaction failed (after any retries).
    Communication(BusError),
    /// Sentinel, CRC-mismatched or out-of-range value.
    InvalidReading(&'static str),
    /// A required channel or GPIO line could not be driven or sampled.
    MissingChannel(&'static str),
}

impl SensorFault {
    /// Only communication failures are worth another attempt.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Communication(_))
    }
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Communication(e) => write!(f, "communication failure ({e})"),
            Self::InvalidReading(what) => write!(f, "invalid reading: {what}"),
            Self::MissingChannel(what) => write!(f, "missing channel: {what}"),
        }
    }
}

impl From<BusError> for SensorFault {
    fn from(e: BusError) -> Self {
        Self::Communication(e)
    }
}


// ---------------------------------------------------------------------------
// Wiring faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringFault {
    /// At least one line does not conduct to its paired sense line.
    OpenLine,
    /// At least one sense line reacts to a drive line it is not paired with.
    CrossedLines,
    OpenAndCrossed,
}

impl WiringFault {
    /// Classify a finished scan. `None` means the harness is good.
    pub const fn classify(all_conduct: bool, any_crossing: bool) -> Option<Self> {
        match (all_conduct, any_crossing) {
            (true, false) => None,
            (false, false) => Some(Self::OpenLine),
            (true, true) => Some(Self::CrossedLines),
            (false, true) => Some(Self::OpenAndCrossed),
        }
    }
}

impl fmt::Display for WiringFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenLine => write!(f, "open line"),
            Self::CrossedLines => write!(f, "crossed lines"),
            Self::OpenAndCrossed => write!(f, "open and crossed lines"),
        }
    }
}


// ---------------------------------------------------------------------------
// Arbitration faults
// ---------------------------------------------------------------------------

/// Unexpected conditions inside mode selection. These abort the cycle and
/// are shown with the fault colour instead of guessing a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbitrationFault {
    /// The button line for this mode could not be sampled.
    ButtonReadFailed(Mode),
    /// The line kept toggling past the sample bound.
    Unstable(Mode),
}

impl fmt::Display for ArbitrationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ButtonReadFailed(mode) => write!(f, "button read failed for {mode}"),
            Self::Unstable(mode) => write!(f, "button for {mode} never settled"),
        }
    }
}


// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
