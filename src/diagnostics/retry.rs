//! Bounded retry for flaky bus transactions.
//!
//! Wraps multi-byte command/response exchanges with protocol sensors.
//! Plain register pokes are not retried. Only
//! [`SensorFault::Communication`] triggers another attempt; any other
//! fault is final and returned as-is.

use embedded_hal::delay::DelayNs;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::SensorFault;

/// Attempts and spacing for one retried transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryBudget {
    pub max_attempts: u8,
    /// Wait between a failed attempt and the next one (milliseconds)
    pub delay_ms: u32,
}

impl RetryBudget {
    pub const fn new(max_attempts: u8, delay_ms: u32) -> Self {
        Self {
            max_attempts,
            delay_ms,
        }
    }
}

/// Run `operation` until it succeeds or the budget is spent.
///
/// `operation` receives the 1-based attempt number. The delay only runs
/// between attempts, so `n` failures followed by a success cost `n`
/// delays, and an exhausted budget of `m` attempts costs `m - 1`.
pub fn with_retry<T, F>(
    budget: RetryBudget,
    delay: &mut dyn DelayNs,
    mut operation: F,
) -> Result<T, SensorFault>
where
    F: FnMut(u8) -> Result<T, SensorFault>,
{
    let attempts = budget.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(fault) if fault.is_retryable() && attempt < attempts => {
                warn!("retry: attempt {}/{} failed ({})", attempt, attempts, fault);
                delay.delay_ms(budget.delay_ms);
                attempt += 1;
            }
            Err(fault) => {
                if fault.is_retryable() {
                    warn!("retry: giving up after {} attempts ({})", attempts, fault);
                }
                return Err(fault);
            }
        }
    }
}
