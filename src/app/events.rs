//! Outbound jig events.
//!
//! The [`TestOrchestrator`](super::orchestrator::TestOrchestrator) emits
//! these through the [`EventSink`](super::ports::EventSink) port. They are
//! the jig's diagnostic text: the serial log adapter prints them, tests
//! record them.

use crate::arbiter::Mode;
use crate::diagnostics::UnhealthyReason;
use crate::error::ArbitrationFault;

/// Structured events emitted once per cycle step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JigEvent {
    /// The arbiter settled on a mode; its diagnostic is about to run.
    ModeSelected(Mode),

    /// No button was pressed during the sweep.
    NoSelection,

    /// One health poll of a multi-poll diagnostic finished unhealthy.
    PollAttempt {
        mode: Mode,
        attempt: u8,
        of: u8,
        reason: UnhealthyReason,
    },

    /// The selected diagnostic reported healthy.
    DiagnosticPassed(Mode),

    /// The selected diagnostic reported unhealthy.
    DiagnosticFailed { mode: Mode, reason: UnhealthyReason },

    /// Mode selection hit an unexpected condition; the cycle was aborted.
    Fault(ArbitrationFault),
}
