//! Harness Jig Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  I2cBus           SignalIndicator      LogEventSink          │
//! │  (BusChannel)     (IndicatorPort)      (EventSink)           │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │          TestOrchestrator (pure logic)                 │  │
//! │  │  ModeArbiter · SensorDiagnostic × 4 · Retry            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  LED timer (50 Hz): IndicatorRenderer · HeartbeatLed         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, Input, Output, PinDriver, Pull};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver, config::TimerConfig};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use log::{info, warn};

use harness_jig::adapters::i2c_bus::I2cBus;
use harness_jig::adapters::indicator::{INDICATOR, SignalIndicator};
use harness_jig::adapters::log_sink::LogEventSink;
use harness_jig::app::orchestrator::{DiagnosticSet, TestOrchestrator};
use harness_jig::arbiter::ModeArbiter;
use harness_jig::config::JigConfig;
use harness_jig::diagnostics::continuity::{ContinuityScanner, WiringHarness};
use harness_jig::drivers::heartbeat::HeartbeatLed;
use harness_jig::drivers::hw_timer;
use harness_jig::drivers::indicator::IndicatorRenderer;
use harness_jig::pins;
use harness_jig::sensors::ina226::Ina226;
use harness_jig::sensors::light_env::LightEnvironmentSensors;
use harness_jig::sensors::scd41::Scd41;

/// Build-time JSON override, e.g. `JIG_CONFIG='{"continuity":{"settle_ms":50}}'`.
fn load_config() -> JigConfig {
    match option_env!("JIG_CONFIG") {
        Some(json) => match JigConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config override applied");
                cfg
            }
            Err(e) => {
                warn!("Config override rejected ({}), using defaults", e);
                JigConfig::default()
            }
        },
        None => JigConfig::default(),
    }
}

/// Claims a GPIO by the number [`pins`] assigns it.
fn gpio(num: i32) -> AnyIOPin {
    // SAFETY: `pins` hands out each number once and `Peripherals::pins` is
    // never claimed, so this is the only handle to the pin.
    unsafe { AnyIOPin::new(num) }
}

fn button(pin: AnyIOPin) -> Result<PinDriver<'static, AnyIOPin, Input>> {
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}

fn sense_line(pin: AnyIOPin) -> Result<PinDriver<'static, AnyIOPin, Input>> {
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Down)?;
    Ok(driver)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Harness Jig v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();
    let p = Peripherals::take().context("peripherals already taken")?;

    // ── 2. LEDs + animation timer ─────────────────────────────
    let indicator_timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::default().frequency(pins::INDICATOR_PWM_FREQ_HZ.Hz()),
    )?;
    let red = LedcDriver::new(p.ledc.channel0, &indicator_timer, gpio(pins::LED_R_GPIO))?;
    let green = LedcDriver::new(p.ledc.channel1, &indicator_timer, gpio(pins::LED_G_GPIO))?;
    let blue = LedcDriver::new(p.ledc.channel2, &indicator_timer, gpio(pins::LED_B_GPIO))?;

    let heartbeat_timer = LedcTimerDriver::new(
        p.ledc.timer1,
        &TimerConfig::default().frequency(pins::HEARTBEAT_PWM_FREQ_HZ.Hz()),
    )?;
    let heartbeat = LedcDriver::new(
        p.ledc.channel3,
        &heartbeat_timer,
        gpio(pins::HEARTBEAT_LED_GPIO),
    )?;

    let _led_timer = hw_timer::start_led_timer(
        IndicatorRenderer::new(red, green, blue, config.indicator.ramp_step),
        HeartbeatLed::new(heartbeat, config.indicator.ramp_step),
        &INDICATOR,
        config.indicator,
    )?;

    // ── 3. Shared sensor bus ──────────────────────────────────
    let i2c = I2cDriver::new(
        p.i2c0,
        gpio(pins::I2C_SDA_GPIO),
        gpio(pins::I2C_SCL_GPIO),
        &I2cConfig::new().baudrate(config.bus.frequency_hz.Hz()),
    )?;
    let mut bus = I2cBus::new(i2c);

    // ── 4. Mode buttons ───────────────────────────────────────
    let buttons = [
        button(gpio(pins::WIRE_TEST_BUTTON_GPIO))?,
        button(gpio(pins::CURRENT_TEST_BUTTON_GPIO))?,
        button(gpio(pins::CO2_TEST_BUTTON_GPIO))?,
        button(gpio(pins::LIGHT_TEST_BUTTON_GPIO))?,
    ];
    let arbiter = ModeArbiter::new(buttons, config.arbiter);

    // ── 5. Harness connector ──────────────────────────────────
    let drive: [PinDriver<'static, AnyOutputPin, Output>; pins::HARNESS_LINES] = [
        PinDriver::output(AnyOutputPin::from(gpio(pins::DRIVE_LINE_GPIOS[0])))?,
        PinDriver::output(AnyOutputPin::from(gpio(pins::DRIVE_LINE_GPIOS[1])))?,
        PinDriver::output(AnyOutputPin::from(gpio(pins::DRIVE_LINE_GPIOS[2])))?,
        PinDriver::output(AnyOutputPin::from(gpio(pins::DRIVE_LINE_GPIOS[3])))?,
        PinDriver::output(AnyOutputPin::from(gpio(pins::DRIVE_LINE_GPIOS[4])))?,
        PinDriver::output(AnyOutputPin::from(gpio(pins::DRIVE_LINE_GPIOS[5])))?,
    ];
    let sense = [
        sense_line(gpio(pins::SENSE_LINE_GPIOS[0]))?,
        sense_line(gpio(pins::SENSE_LINE_GPIOS[1]))?,
        sense_line(gpio(pins::SENSE_LINE_GPIOS[2]))?,
        sense_line(gpio(pins::SENSE_LINE_GPIOS[3]))?,
        sense_line(gpio(pins::SENSE_LINE_GPIOS[4]))?,
        sense_line(gpio(pins::SENSE_LINE_GPIOS[5]))?,
    ];
    let harness = WiringHarness::new(ContinuityScanner::new(
        drive,
        sense,
        config.continuity.settle_ms,
    ));

    // ── 6. Orchestrator ───────────────────────────────────────
    let diagnostics = DiagnosticSet::new(
        Box::new(harness),
        Box::new(Ina226::new(config.current)),
        Box::new(Scd41::new(&config.bus, config.co2)),
        Box::new(LightEnvironmentSensors::new(config.light)),
    );
    let mut orchestrator = TestOrchestrator::new(arbiter, diagnostics);

    let mut indicator = SignalIndicator::new(&INDICATOR);
    let mut sink = LogEventSink::new();
    let mut delay = FreeRtos;

    info!("Jig ready, waiting for a mode button");

    // ── 7. Main loop ──────────────────────────────────────────
    loop {
        let outcome = orchestrator.run_cycle(&mut bus, &mut delay, &mut indicator, &mut sink);
        log::debug!("cycle: {:?}", outcome);
    }
}
