//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every jig event to the logger
//! (UART / USB-CDC in production). This is the operator-facing text of
//! the jig.

use log::{error, info, warn};

use crate::app::events::JigEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`JigEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &JigEvent) {
        match event {
            JigEvent::ModeSelected(mode) => {
                info!("MODE  | {} selected", mode);
            }
            JigEvent::NoSelection => {
                info!("MODE  | none selected");
            }
            JigEvent::PollAttempt { mode, attempt, of, reason } => {
                warn!("POLL  | {} attempt {}/{} unhealthy: {}", mode, attempt, of, reason);
            }
            JigEvent::DiagnosticPassed(mode) => {
                info!("PASS  | {} is working", mode);
            }
            JigEvent::DiagnosticFailed { mode, reason } => {
                warn!("FAIL  | {} is not working: {}", mode, reason);
            }
            JigEvent::Fault(fault) => {
                error!("FAULT | {}", fault);
            }
        }
    }
}
