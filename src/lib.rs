//! Harness jig firmware library.
//!
//! Exposes the jig logic for integration testing. Everything outside
//! `drivers::hw_timer` is hardware-agnostic and runs on the host; the
//! ESP-IDF-only pieces are gated behind the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod arbiter;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod sensors;
