//! Periodic LED animation timer.
//!
//! Runs in the ESP timer task (not ISR context). Each tick picks up any
//! colour posted by the control loop, then advances both the result
//! indicator and the heartbeat LED. The control loop never waits on it.

use core::time::Duration;

use embedded_hal::pwm::SetDutyCycle;
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};
use log::{info, warn};

use crate::adapters::indicator::IndicatorSignal;
use crate::config::IndicatorConfig;

use super::heartbeat::HeartbeatLed;
use super::indicator::IndicatorRenderer;

/// Start the animation timer. The returned handle must be kept alive;
/// dropping it cancels the timer.
pub fn start_led_timer<P, H>(
    mut indicator: IndicatorRenderer<P>,
    mut heartbeat: HeartbeatLed<H>,
    pending: &'static IndicatorSignal,
    config: IndicatorConfig,
) -> anyhow::Result<EspTimer<'static>>
where
    P: SetDutyCycle + Send + 'static,
    H: SetDutyCycle + Send + 'static,
{
    let service = EspTaskTimerService::new()?;
    let timer = service.timer(move || {
        if let Err(e) = indicator.service(pending) {
            warn!("hw_timer: indicator update failed: {:?}", e);
        }
        if let Err(e) = heartbeat.tick() {
            warn!("hw_timer: heartbeat update failed: {:?}", e);
        }
    })?;

    let period = Duration::from_micros(1_000_000 / u64::from(config.tick_hz.max(1)));
    timer.every(period)?;
    info!("hw_timer: LED animation @ {} Hz started", config.tick_hz);
    Ok(timer)
}
