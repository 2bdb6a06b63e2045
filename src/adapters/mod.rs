//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                         |
//! |-------------|---------------|-------------------------------------|
//! | `i2c_bus`   | BusChannel    | Any embedded-hal 1.0 I2C bus        |
//! | `indicator` | IndicatorPort | Signal slot read by the LED timer   |
//! | `log_sink`  | EventSink     | Serial log output                   |

pub mod i2c_bus;
pub mod indicator;
pub mod log_sink;
