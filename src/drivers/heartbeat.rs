//! Power / heartbeat LED.
//!
//! Breathes continuously while the jig is powered, independent of the
//! test cycle, so the operator can tell a hung board from an idle one.

use embedded_hal::pwm::SetDutyCycle;

use super::indicator::{BreathingRamp, scaled_duty};

pub struct HeartbeatLed<P> {
    channel: P,
    ramp: BreathingRamp,
}

impl<P: SetDutyCycle> HeartbeatLed<P> {
    pub fn new(channel: P, step: u16) -> Self {
        Self {
            channel,
            ramp: BreathingRamp::new(step),
        }
    }

    /// Write the current level, then advance the ramp.
    pub fn tick(&mut self) -> Result<(), P::Error> {
        let max = self.channel.max_duty_cycle();
        self.channel
            .set_duty_cycle(scaled_duty(self.ramp.level(), 1.0, max))?;
        self.ramp.advance();
        Ok(())
    }
}
