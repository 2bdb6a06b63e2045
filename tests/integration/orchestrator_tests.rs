//! Full-cycle tests: buttons → arbiter → real diagnostics → mock bus/pins.
//!
//! Every diagnostic here is the production implementation; only the
//! hardware underneath is simulated.

use crate::mock_hw::{
    self, MockBus, MockButton, RecordingDelay, RecordingIndicator, RecordingSink, SimHarness,
};

use harness_jig::app::events::JigEvent;
use harness_jig::app::orchestrator::{CycleOutcome, DiagnosticSet, TestOrchestrator};
use harness_jig::app::ports::Colour;
use harness_jig::arbiter::{Mode, ModeArbiter};
use harness_jig::config::JigConfig;
use harness_jig::diagnostics::UnhealthyReason;
use harness_jig::diagnostics::continuity::{ContinuityScanner, WiringHarness};
use harness_jig::error::{ArbitrationFault, WiringFault};
use harness_jig::sensors::ina226::Ina226;
use harness_jig::sensors::light_env::LightEnvironmentSensors;
use harness_jig::sensors::scd41::Scd41;

struct Rig {
    orchestrator: TestOrchestrator<MockButton>,
    bus: MockBus,
    delay: RecordingDelay,
    indicator: RecordingIndicator,
    sink: RecordingSink,
}

impl Rig {
    fn new(buttons: [MockButton; 4], harness: &SimHarness) -> Self {
        let config = JigConfig::default();
        let wiring = WiringHarness::new(ContinuityScanner::new(
            harness.drive_pins(),
            harness.sense_pins(),
            config.continuity.settle_ms,
        ));
        let diagnostics = DiagnosticSet::new(
            Box::new(wiring),
            Box::new(Ina226::new(config.current)),
            Box::new(Scd41::new(&config.bus, config.co2)),
            Box::new(LightEnvironmentSensors::new(config.light)),
        );
        Self {
            orchestrator: TestOrchestrator::new(
                ModeArbiter::new(buttons, config.arbiter),
                diagnostics,
            ),
            bus: MockBus::new(),
            delay: RecordingDelay::default(),
            indicator: RecordingIndicator::default(),
            sink: RecordingSink::default(),
        }
    }

    fn pressing(mode: usize) -> Self {
        Self::new(mock_hw::buttons(&[mode]), &SimHarness::good())
    }

    fn cycle(&mut self) -> CycleOutcome {
        self.orchestrator.run_cycle(
            &mut self.bus,
            &mut self.delay,
            &mut self.indicator,
            &mut self.sink,
        )
    }
}

// ── Selection ─────────────────────────────────────────────────

#[test]
fn idle_when_nothing_pressed() {
    let mut rig = Rig::new(mock_hw::buttons(&[]), &SimHarness::good());
    assert_eq!(rig.cycle(), CycleOutcome::Idle);
    assert_eq!(rig.indicator.last(), Some(Colour::IDLE));
    assert_eq!(rig.sink.events, vec![JigEvent::NoSelection]);
    assert!(rig.bus.ops.is_empty(), "idle cycle must not touch the bus");
}

#[test]
fn first_pressed_button_wins() {
    let harness = SimHarness::good();
    let mut rig = Rig::new(mock_hw::buttons(&[0, 2]), &harness);
    assert_eq!(rig.cycle(), CycleOutcome::Passed(Mode::WireTest));
    assert_eq!(rig.orchestrator.arbiter().active_mode(), Mode::WireTest);
    assert!(
        rig.bus.sends_to(mock_hw::SCD41).is_empty(),
        "losing CO2 mode must not run"
    );
}

#[test]
fn chattering_button_is_a_fault() {
    let buttons = [
        MockButton::chattering(),
        MockButton::released(),
        MockButton::released(),
        MockButton::released(),
    ];
    let mut rig = Rig::new(buttons, &SimHarness::good());
    let outcome = rig.cycle();
    assert_eq!(outcome, CycleOutcome::Fault(ArbitrationFault::Unstable(Mode::WireTest)));
    assert_eq!(rig.indicator.last(), Some(Colour::FAULT));
    assert_eq!(
        rig.sink.events,
        vec![JigEvent::Fault(ArbitrationFault::Unstable(Mode::WireTest))]
    );
}

#[test]
fn every_cycle_signals_exactly_once() {
    let mut rig = Rig::pressing(0);
    rig.cycle();
    rig.cycle();
    assert_eq!(rig.indicator.colours, vec![Colour::PASS, Colour::PASS]);
}

// ── Wire test ─────────────────────────────────────────────────

#[test]
fn good_harness_passes() {
    let harness = SimHarness::good();
    let mut rig = Rig::new(mock_hw::buttons(&[0]), &harness);
    assert_eq!(rig.cycle(), CycleOutcome::Passed(Mode::WireTest));
    assert_eq!(rig.indicator.last(), Some(Colour::PASS));
    assert_eq!(
        rig.sink.events,
        vec![
            JigEvent::ModeSelected(Mode::WireTest),
            JigEvent::DiagnosticPassed(Mode::WireTest),
        ]
    );
    assert_eq!(harness.max_driven_at_once(), 1);
    assert!(!harness.any_driven(), "scan must leave every line low");
}

#[test]
fn crossed_pair_fails_wire_test() {
    let harness = SimHarness::good().short(2, 4);
    let mut rig = Rig::new(mock_hw::buttons(&[0]), &harness);
    assert_eq!(
        rig.cycle(),
        CycleOutcome::Failed(Mode::WireTest, UnhealthyReason::Wiring(WiringFault::CrossedLines))
    );
    assert_eq!(rig.indicator.last(), Some(Colour::FAIL));
}

#[test]
fn open_and_crossed_harness_reports_both() {
    let harness = SimHarness::good().open(0).short(3, 1);
    let mut rig = Rig::new(mock_hw::buttons(&[0]), &harness);
    assert_eq!(
        rig.cycle(),
        CycleOutcome::Failed(
            Mode::WireTest,
            UnhealthyReason::Wiring(WiringFault::OpenAndCrossed)
        )
    );
}

#[test]
fn wire_scan_settles_after_every_edge() {
    let mut rig = Rig::pressing(0);
    rig.cycle();
    // 2 passes × 6 lines × (rise + fall)
    assert_eq!(rig.delay.count(100), 24);
}

// ── Current test ──────────────────────────────────────────────

#[test]
fn current_sensor_configured_then_checked() {
    let mut rig = Rig::pressing(1);
    mock_hw::install_ina226(&mut rig.bus);
    assert_eq!(rig.cycle(), CycleOutcome::Passed(Mode::CurrentTest));
    assert_eq!(
        rig.bus.writes_to(mock_hw::INA226),
        vec![(0x00, vec![0x41, 0x27]), (0x05, vec![0x20, 0x00])]
    );
}

#[test]
fn absent_current_sensor_fails() {
    let mut rig = Rig::pressing(1);
    // Config writes succeed but every read NACKs.
    assert_eq!(
        rig.cycle(),
        CycleOutcome::Failed(Mode::CurrentTest, UnhealthyReason::CommunicationFailure)
    );
    assert_eq!(rig.indicator.last(), Some(Colour::FAIL));
}

// ── CO2 test ──────────────────────────────────────────────────

#[test]
fn co2_passes_on_fifth_poll_without_a_sixth() {
    let mut rig = Rig::pressing(2);
    for _ in 0..4 {
        rig.bus.responses.push_back(Ok(mock_hw::scd41_corrupt_frame()));
    }
    rig.bus.responses.push_back(Ok(mock_hw::scd41_frame()));
    rig.bus.responses.push_back(Ok(mock_hw::scd41_frame()));

    assert_eq!(rig.cycle(), CycleOutcome::Passed(Mode::Co2Test));

    let sends = rig.bus.sends_to(mock_hw::SCD41);
    let reads = sends.iter().filter(|s| s.as_slice() == [0xEC, 0x05]).count();
    assert_eq!(reads, 5, "exactly five polls");
    assert_eq!(sends.first().map(Vec::as_slice), Some(&[0x21, 0xB1][..]));
    assert_eq!(sends.last().map(Vec::as_slice), Some(&[0x3F, 0x86][..]));
    assert_eq!(rig.bus.responses.len(), 1, "sixth response never fetched");

    assert_eq!(rig.sink.poll_attempts(), 4);
    assert_eq!(rig.delay.count(5000), 5, "start settle plus four poll gaps");
    assert_eq!(rig.indicator.last(), Some(Colour::PASS));
}

#[test]
fn co2_fails_after_five_bad_polls() {
    let mut rig = Rig::pressing(2);
    for _ in 0..5 {
        rig.bus.responses.push_back(Ok(mock_hw::scd41_corrupt_frame()));
    }
    assert_eq!(
        rig.cycle(),
        CycleOutcome::Failed(Mode::Co2Test, UnhealthyReason::InvalidReading)
    );
    assert_eq!(rig.sink.poll_attempts(), 5);
    assert!(matches!(
        rig.sink.events.last(),
        Some(JigEvent::DiagnosticFailed { mode: Mode::Co2Test, .. })
    ));
}

#[test]
fn co2_silent_sensor_is_bounded() {
    let mut rig = Rig::pressing(2);
    assert_eq!(
        rig.cycle(),
        CycleOutcome::Failed(Mode::Co2Test, UnhealthyReason::CommunicationFailure)
    );
    // Five polls × three response attempts, never more.
    let receives = rig
        .bus
        .ops
        .iter()
        .filter(|op| matches!(op, mock_hw::BusOp::Receive { .. }))
        .count();
    assert_eq!(receives, 15);
}

#[test]
fn co2_start_nack_is_retried_then_fails_test() {
    let mut rig = Rig::pressing(2);
    for _ in 0..3 {
        rig.bus.failures.push_back(harness_jig::error::BusError::Nack);
    }
    assert_eq!(
        rig.cycle(),
        CycleOutcome::Failed(Mode::Co2Test, UnhealthyReason::CommunicationFailure)
    );
    assert_eq!(rig.sink.poll_attempts(), 0, "no polls after a failed start");
    let sends = rig.bus.sends_to(mock_hw::SCD41);
    assert_eq!(sends.last().map(Vec::as_slice), Some(&[0x3F, 0x86][..]));
}

// ── Light test ────────────────────────────────────────────────

#[test]
fn light_pair_passes_when_both_respond() {
    let mut rig = Rig::pressing(3);
    mock_hw::install_bme280(&mut rig.bus);
    mock_hw::install_tsl2591(&mut rig.bus, 1000, 400);
    assert_eq!(rig.cycle(), CycleOutcome::Passed(Mode::LightTest));
}

#[test]
fn light_pair_fails_without_bme280() {
    let mut rig = Rig::pressing(3);
    mock_hw::install_tsl2591(&mut rig.bus, 1000, 400);
    assert_eq!(
        rig.cycle(),
        CycleOutcome::Failed(Mode::LightTest, UnhealthyReason::CommunicationFailure)
    );
}
