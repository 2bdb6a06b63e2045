//! Sample-until-agree debounce window for one button line.
//!
//! ```text
//!   Idle ──first sample──▶ Sampling ──two equal samples──▶ Stable(level)
//!                            │   ▲
//!                            └───┘ level changed: restart from new level
//! ```
//!
//! The window is created fresh for every line in a sweep and dropped once
//! it reports `Stable` (or the sweep gives up on the line).

/// Debounce state for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Sampling { previous: bool, samples: u16 },
    Stable(bool),
}

/// Transient per-line debounce window.
#[derive(Debug, Clone, Copy)]
pub struct DebounceWindow {
    state: DebounceState,
    max_samples: u16,
}

impl DebounceWindow {
    pub fn new(max_samples: u16) -> Self {
        Self {
            state: DebounceState::Idle,
            max_samples,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Feed one raw line sample. Returns the new state.
    pub fn feed(&mut self, level: bool) -> DebounceState {
        self.state = match self.state {
            DebounceState::Idle => DebounceState::Sampling {
                previous: level,
                samples: 1,
            },
            DebounceState::Sampling { previous, .. } if previous == level => {
                DebounceState::Stable(level)
            }
            DebounceState::Sampling { samples, .. } => DebounceState::Sampling {
                previous: level,
                samples: samples.saturating_add(1),
            },
            stable @ DebounceState::Stable(_) => stable,
        };
        self.state
    }

    /// True once the line has toggled on every sample up to the bound.
    pub fn exhausted(&self) -> bool {
        matches!(self.state, DebounceState::Sampling { samples, .. } if samples >= self.max_samples)
    }
}
