//! Test orchestrator: one operator activation per [`run_cycle`] call.
//!
//! ```text
//!  buttons ──▶ ModeArbiter ──▶ ┌──────────────────────┐ ──▶ EventSink
//!                              │   TestOrchestrator    │
//!  BusChannel ◀───────────────▶│  dyn SensorDiagnostic │ ──▶ IndicatorPort
//!                              └──────────────────────┘
//! ```
//!
//! A cycle always runs to completion: every wait inside it is bounded by
//! the arbiter's sample limit, the retry budgets and the poll plan.
//!
//! [`run_cycle`]: TestOrchestrator::run_cycle

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use log::{info, warn};

use crate::arbiter::{Mode, ModeArbiter};
use crate::diagnostics::{HealthResult, SensorDiagnostic, UnhealthyReason};
use crate::error::ArbitrationFault;

use super::events::JigEvent;
use super::ports::{BusChannel, Colour, EventSink, IndicatorPort};

/// The four diagnostics, one per selectable mode.
pub struct DiagnosticSet {
    slots: [Box<dyn SensorDiagnostic>; Mode::COUNT],
}

impl DiagnosticSet {
    pub fn new(
        wiring: Box<dyn SensorDiagnostic>,
        current: Box<dyn SensorDiagnostic>,
        co2: Box<dyn SensorDiagnostic>,
        light: Box<dyn SensorDiagnostic>,
    ) -> Self {
        Self {
            slots: [wiring, current, co2, light],
        }
    }

    /// Diagnostic bound to `mode`; `Mode::None` has none.
    pub fn get_mut(&mut self, mode: Mode) -> Option<&mut dyn SensorDiagnostic> {
        match mode {
            Mode::None => None,
            m => Some(self.slots[m as usize].as_mut()),
        }
    }
}

/// What one cycle ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Idle,
    Passed(Mode),
    Failed(Mode, UnhealthyReason),
    Fault(ArbitrationFault),
}

impl CycleOutcome {
    /// Indicator colour for this outcome.
    pub const fn colour(&self) -> Colour {
        match self {
            Self::Idle => Colour::IDLE,
            Self::Passed(_) => Colour::PASS,
            Self::Failed(..) => Colour::FAIL,
            Self::Fault(_) => Colour::FAULT,
        }
    }
}

pub struct TestOrchestrator<B> {
    arbiter: ModeArbiter<B>,
    diagnostics: DiagnosticSet,
}

impl<B: InputPin> TestOrchestrator<B> {
    pub fn new(arbiter: ModeArbiter<B>, diagnostics: DiagnosticSet) -> Self {
        Self {
            arbiter,
            diagnostics,
        }
    }

    pub fn arbiter(&self) -> &ModeArbiter<B> {
        &self.arbiter
    }

    /// Select a mode, run its diagnostic and signal the verdict.
    pub fn run_cycle(
        &mut self,
        bus: &mut dyn BusChannel,
        delay: &mut dyn DelayNs,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        let outcome = match self.arbiter.poll_selected_mode(delay) {
            Err(fault) => {
                warn!("orchestrator: aborting cycle, {}", fault);
                sink.emit(&JigEvent::Fault(fault));
                CycleOutcome::Fault(fault)
            }
            Ok(mode) => match self.diagnostics.get_mut(mode) {
                None => {
                    sink.emit(&JigEvent::NoSelection);
                    CycleOutcome::Idle
                }
                Some(diagnostic) => {
                    sink.emit(&JigEvent::ModeSelected(mode));
                    match dispatch(diagnostic, mode, bus, delay, sink) {
                        HealthResult::Healthy => {
                            sink.emit(&JigEvent::DiagnosticPassed(mode));
                            CycleOutcome::Passed(mode)
                        }
                        HealthResult::Unhealthy(reason) => {
                            sink.emit(&JigEvent::DiagnosticFailed { mode, reason });
                            CycleOutcome::Failed(mode, reason)
                        }
                    }
                }
            },
        };

        indicator.signal(outcome.colour());
        outcome
    }
}

/// prepare ─ poll (per plan, early exit on healthy) ─ finish
fn dispatch(
    diagnostic: &mut dyn SensorDiagnostic,
    mode: Mode,
    bus: &mut dyn BusChannel,
    delay: &mut dyn DelayNs,
    sink: &mut impl EventSink,
) -> HealthResult {
    info!("orchestrator: running {}", diagnostic.name());

    let result = match diagnostic.prepare(bus, delay) {
        Ok(()) => poll(diagnostic, mode, bus, delay, sink),
        Err(fault) => {
            warn!("orchestrator: {} failed to start ({})", diagnostic.name(), fault);
            HealthResult::Unhealthy(fault.into())
        }
    };

    if let Err(fault) = diagnostic.finish(bus, delay) {
        warn!("orchestrator: {} failed to stop ({})", diagnostic.name(), fault);
    }
    result
}

fn poll(
    diagnostic: &mut dyn SensorDiagnostic,
    mode: Mode,
    bus: &mut dyn BusChannel,
    delay: &mut dyn DelayNs,
    sink: &mut impl EventSink,
) -> HealthResult {
    let plan = diagnostic.poll_plan();
    let attempts = plan.attempts.max(1);

    let mut attempt = 1;
    loop {
        let result = diagnostic.check_health(bus, delay);
        let HealthResult::Unhealthy(reason) = result else {
            return result;
        };
        if attempts > 1 {
            sink.emit(&JigEvent::PollAttempt {
                mode,
                attempt,
                of: attempts,
                reason,
            });
        }
        if attempt >= attempts {
            return result;
        }
        delay.delay_ms(plan.interval_ms);
        attempt += 1;
    }
}
