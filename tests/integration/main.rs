//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock hardware. All tests run on the host with no real
//! peripherals required.

mod mock_hw;
mod orchestrator_tests;
