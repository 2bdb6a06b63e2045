//! Breathing RGB result indicator.
//!
//! Three PWM channels drive the R/G/B dies of the result LED. The renderer
//! is ticked from a periodic timer (50 Hz); every tick advances a shared
//! brightness ramp and writes `ramp × intensity` to each channel.
//!
//! ```text
//!   duty  0 ─1024─▶ 65535 ─1024─▶ 0 ─▶ ...   (bounces at both ends)
//! ```
//!
//! The control loop never touches the channels. It posts a colour through
//! [`IndicatorSignal`](crate::adapters::indicator::IndicatorSignal) and the
//! renderer adopts it on its next tick.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::Colour;

/// Full-scale value of the ramp.
pub const RAMP_MAX: u16 = u16::MAX;

/// Triangular brightness ramp on a 16-bit scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathingRamp {
    duty: i32,
    step: i32,
}

impl BreathingRamp {
    pub fn new(step: u16) -> Self {
        Self {
            duty: 0,
            step: i32::from(step.max(1)),
        }
    }

    /// Current level, clamped to the 16-bit range.
    pub fn level(&self) -> u16 {
        self.duty.clamp(0, i32::from(RAMP_MAX)) as u16
    }

    pub fn rising(&self) -> bool {
        self.step > 0
    }

    /// Advance one step and reverse direction at either end.
    pub fn advance(&mut self) -> u16 {
        self.duty += self.step;
        if self.duty >= i32::from(RAMP_MAX) || self.duty <= 0 {
            self.step = -self.step;
        }
        self.level()
    }

    pub fn reset(&mut self) {
        self.duty = 0;
        self.step = self.step.abs();
    }
}

/// Scale `level` by `intensity` onto a channel with `max_duty` resolution.
pub fn scaled_duty(level: u16, intensity: f32, max_duty: u16) -> u16 {
    (f32::from(level) * intensity.clamp(0.0, 1.0) * f32::from(max_duty) / f32::from(RAMP_MAX)) as u16
}

pub struct IndicatorRenderer<P> {
    red: P,
    green: P,
    blue: P,
    ramp: BreathingRamp,
    colour: Option<Colour>,
}

impl<P: SetDutyCycle> IndicatorRenderer<P> {
    pub fn new(red: P, green: P, blue: P, step: u16) -> Self {
        Self {
            red,
            green,
            blue,
            ramp: BreathingRamp::new(step),
            colour: None,
        }
    }

    /// Begin breathing in `colour`. The ramp restarts from dark.
    pub fn start(&mut self, colour: Colour) {
        self.ramp.reset();
        self.colour = Some(colour);
    }

    /// Stop animating and turn every channel off.
    pub fn stop(&mut self) -> Result<(), P::Error> {
        self.colour = None;
        self.ramp.reset();
        self.write(0, Colour::OFF)
    }

    pub fn colour(&self) -> Option<Colour> {
        self.colour
    }

    /// One animation step. Does nothing while stopped.
    pub fn tick(&mut self) -> Result<(), P::Error> {
        let Some(colour) = self.colour else {
            return Ok(());
        };
        let level = self.ramp.advance();
        self.write(level, colour)
    }

    /// Adopt a pending colour posted by the control loop, then tick.
    pub fn service(&mut self, pending: &Signal<CriticalSectionRawMutex, Colour>) -> Result<(), P::Error> {
        if let Some(colour) = pending.try_take() {
            if colour == Colour::OFF {
                return self.stop();
            }
            self.start(colour);
        }
        self.tick()
    }

    fn write(&mut self, level: u16, colour: Colour) -> Result<(), P::Error> {
        let max = self.red.max_duty_cycle();
        self.red.set_duty_cycle(scaled_duty(level, colour.red, max))?;
        let max = self.green.max_duty_cycle();
        self.green.set_duty_cycle(scaled_duty(level, colour.green, max))?;
        let max = self.blue.max_duty_cycle();
        self.blue.set_duty_cycle(scaled_duty(level, colour.blue, max))?;
        Ok(())
    }
}
