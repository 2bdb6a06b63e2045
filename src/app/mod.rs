//! Application core: test orchestration with no direct I/O.
//!
//! The orchestrator composes the mode arbiter with the sensor diagnostics
//! and reports every outcome through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod orchestrator;
pub mod ports;
