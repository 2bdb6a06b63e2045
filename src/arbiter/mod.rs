//! Mode arbiter: debounced, mutually-exclusive test selection.
//!
//! Four active-low push buttons (internal pull-up) select which
//! diagnostic runs. Every poll is a single sweep over the buttons in
//! [`Mode::SELECTABLE`] order:
//!
//! 1. Sample the line, then re-sample every `debounce_ms` until two
//!    consecutive samples agree ([`debounce::DebounceWindow`]).
//! 2. If the stable level is low (pressed), that mode wins: every other
//!    mode is forced back to idle and the sweep ends immediately.
//! 3. If no line settles low, the sweep returns [`Mode::None`].
//!
//! Arbitration is first-match-wins and non-preemptive. Each poll starts by
//! resetting all modes to idle, so a previous winner never biases the next
//! sweep.

pub mod debounce;

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use log::{debug, info, warn};

use crate::config::ArbiterConfig;
use crate::error::ArbitrationFault;
use debounce::{DebounceState, DebounceWindow};

/// Test mode selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    WireTest = 0,
    CurrentTest = 1,
    Co2Test = 2,
    LightTest = 3,
    None = 4,
}

impl Mode {
    /// Number of button-backed modes.
    pub const COUNT: usize = 4;

    /// Sweep order. Earlier entries win ties.
    pub const SELECTABLE: [Self; Self::COUNT] = [
        Self::WireTest,
        Self::CurrentTest,
        Self::Co2Test,
        Self::LightTest,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::WireTest => "wire test",
            Self::CurrentTest => "current test",
            Self::Co2Test => "CO2 test",
            Self::LightTest => "light test",
            Self::None => "no selection",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Line level of a released (idle) button.
const IDLE_LEVEL: bool = true;

pub struct ModeArbiter<B> {
    /// Button lines, indexed in [`Mode::SELECTABLE`] order.
    buttons: [B; Mode::COUNT],
    /// Last debounced level per mode; `IDLE_LEVEL` unless that mode won.
    line_states: [bool; Mode::COUNT],
    active: Mode,
    config: ArbiterConfig,
}

impl<B: InputPin> ModeArbiter<B> {
    pub fn new(buttons: [B; Mode::COUNT], config: ArbiterConfig) -> Self {
        Self {
            buttons,
            line_states: [IDLE_LEVEL; Mode::COUNT],
            active: Mode::None,
            config,
        }
    }

    /// Mode chosen by the most recent sweep.
    pub fn active_mode(&self) -> Mode {
        self.active
    }

    /// Debounced level recorded for `mode` by the most recent sweep.
    pub fn line_state(&self, mode: Mode) -> bool {
        match mode {
            Mode::None => IDLE_LEVEL,
            m => self.line_states[m as usize],
        }
    }

    /// Run one sweep and return the stabilised selection.
    pub fn poll_selected_mode(&mut self, delay: &mut dyn DelayNs) -> Result<Mode, ArbitrationFault> {
        self.deactivate_all();

        for (idx, mode) in Mode::SELECTABLE.into_iter().enumerate() {
            let level = self.settle(idx, mode, delay)?;
            if level != IDLE_LEVEL {
                self.deactivate_all();
                self.line_states[idx] = level;
                self.active = mode;
                info!("arbiter: {} selected", mode);
                return Ok(mode);
            }
        }

        debug!("arbiter: no button pressed");
        Ok(Mode::None)
    }

    /// Sample one line until two consecutive readings agree.
    fn settle(&mut self, idx: usize, mode: Mode, delay: &mut dyn DelayNs) -> Result<bool, ArbitrationFault> {
        let mut window = DebounceWindow::new(self.config.max_samples);
        window.feed(self.sample(idx, mode)?);

        loop {
            delay.delay_ms(self.config.debounce_ms);
            if let DebounceState::Stable(level) = window.feed(self.sample(idx, mode)?) {
                return Ok(level);
            }
            if window.exhausted() {
                warn!("arbiter: {} line still bouncing, giving up", mode);
                return Err(ArbitrationFault::Unstable(mode));
            }
        }
    }

    fn sample(&mut self, idx: usize, mode: Mode) -> Result<bool, ArbitrationFault> {
        self.buttons[idx]
            .is_high()
            .map_err(|_| ArbitrationFault::ButtonReadFailed(mode))
    }

    fn deactivate_all(&mut self) {
        self.line_states = [IDLE_LEVEL; Mode::COUNT];
        self.active = Mode::None;
    }
}
