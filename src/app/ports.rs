//! Port traits: the hexagonal boundary between jig logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TestOrchestrator (domain)
//! ```
//!
//! Driven adapters (I2C bus, indicator renderer, event sinks) implement
//! these traits. GPIO lines and delays use the `embedded-hal` 1.0 traits
//! directly, so any HAL pin or delay plugs straight in.

use crate::error::BusError;

// ───────────────────────────────────────────────────────────────
// Bus channel (driven adapter: shared I2C bus)
// ───────────────────────────────────────────────────────────────

/// Addressable read/write access to the shared sensor bus.
///
/// The channel is handed to the core already opened. Transactions are
/// strictly sequential; only the diagnostic currently dispatched by the
/// orchestrator holds it.
pub trait BusChannel {
    /// Write `bytes` to `register` of the device at `address`.
    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), BusError>;

    /// Read `buf.len()` bytes starting at `register`.
    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Raw write with no register prefix (command-protocol devices).
    fn send(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError>;

    /// Raw read with no register prefix.
    fn receive(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Indicator (driven adapter: domain → RGB renderer)
// ───────────────────────────────────────────────────────────────

/// RGB intensity triple, each channel 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Colour {
    /// Build a colour, clamping every channel into 0.0–1.0.
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red: clamp_unit(red),
            green: clamp_unit(green),
            blue: clamp_unit(blue),
        }
    }

    pub const OFF: Self = Self { red: 0.0, green: 0.0, blue: 0.0 };
    /// Diagnostic passed.
    pub const PASS: Self = Self { red: 0.0, green: 1.0, blue: 0.0 };
    /// Diagnostic failed.
    pub const FAIL: Self = Self { red: 1.0, green: 0.0, blue: 0.0 };
    /// No mode selected.
    pub const IDLE: Self = Self { red: 0.5, green: 0.0, blue: 0.5 };
    /// Unexpected internal fault.
    pub const FAULT: Self = Self { red: 0.0, green: 0.0, blue: 1.0 };
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Fire-and-forget colour signal. Implementations must return without
/// waiting on the animation.
pub trait IndicatorPort {
    fn signal(&mut self, colour: Colour);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The orchestrator emits structured [`JigEvent`](super::events::JigEvent)s
/// through this port. Adapters decide where they go (serial log, test
/// recorder, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::JigEvent);
}
