//! LED drivers and the timer that animates them.

pub mod heartbeat;
#[cfg(feature = "espidf")]
pub mod hw_timer;
pub mod indicator;
