//! Indicator adapter: control loop → renderer hand-off.
//!
//! Implements [`IndicatorPort`] by overwriting a single-slot
//! `embassy-sync` [`Signal`]. Posting never blocks; if the renderer has
//! not consumed the previous colour yet, the newer one replaces it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::debug;

use crate::app::ports::{Colour, IndicatorPort};

pub type IndicatorSignal = Signal<CriticalSectionRawMutex, Colour>;

/// Hand-off slot read by the indicator timer callback.
pub static INDICATOR: IndicatorSignal = Signal::new();

pub struct SignalIndicator {
    slot: &'static IndicatorSignal,
}

impl SignalIndicator {
    pub fn new(slot: &'static IndicatorSignal) -> Self {
        Self { slot }
    }
}

impl Default for SignalIndicator {
    fn default() -> Self {
        Self::new(&INDICATOR)
    }
}

impl IndicatorPort for SignalIndicator {
    fn signal(&mut self, colour: Colour) {
        debug!(
            "indicator: r={:.2} g={:.2} b={:.2}",
            colour.red, colour.green, colour.blue
        );
        self.slot.signal(colour);
    }
}
