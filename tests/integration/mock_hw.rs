//! Mock hardware for integration tests.
//!
//! Scripted buttons, a simulated harness connector, a register-map sensor
//! bus and recorders for delays, indicator colours and jig events. Nothing
//! here touches real GPIO or I2C.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};

use harness_jig::app::events::JigEvent;
use harness_jig::app::ports::{BusChannel, Colour, EventSink, IndicatorPort};
use harness_jig::error::BusError;
use harness_jig::sensors::sensirion_crc8;

// ── Buttons ───────────────────────────────────────────────────

/// Button that replays a script of levels, then holds the last one.
/// Every level it returns is recorded in `seen`.
pub struct MockButton {
    script: VecDeque<bool>,
    last: bool,
    pub seen: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl MockButton {
    pub fn scripted(levels: &[bool], then: bool) -> Self {
        Self {
            script: levels.iter().copied().collect(),
            last: then,
            seen: Rc::default(),
        }
    }

    pub fn released() -> Self {
        Self::scripted(&[], true)
    }

    pub fn held() -> Self {
        Self::scripted(&[], false)
    }

    /// Toggles on every read; never settles.
    pub fn chattering() -> Self {
        let levels: Vec<bool> = (0..1000).map(|i| i % 2 == 0).collect();
        Self::scripted(&levels, true)
    }
}

impl digital::ErrorType for MockButton {
    type Error = Infallible;
}

impl InputPin for MockButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        if let Some(level) = self.script.pop_front() {
            self.last = level;
        }
        self.seen.borrow_mut().push(self.last);
        Ok(self.last)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

/// Buttons in mode order with `pressed` held down.
#[allow(dead_code)]
pub fn buttons(pressed: &[usize]) -> [MockButton; 4] {
    core::array::from_fn(|i| {
        if pressed.contains(&i) {
            MockButton::held()
        } else {
            MockButton::released()
        }
    })
}

// ── Harness connector ─────────────────────────────────────────

pub const LINES: usize = 6;

pub struct HarnessState {
    driven: [bool; LINES],
    /// `links[i][j]`: driving line i raises sense line j.
    links: [[bool; LINES]; LINES],
    pub max_driven_at_once: usize,
}

/// Simulated cable under test plus its connector pins.
#[derive(Clone)]
pub struct SimHarness(pub Rc<RefCell<HarnessState>>);

#[allow(dead_code)]
impl SimHarness {
    /// Every wire conducts, nothing crosses.
    pub fn good() -> Self {
        let mut links = [[false; LINES]; LINES];
        for (i, row) in links.iter_mut().enumerate() {
            row[i] = true;
        }
        Self(Rc::new(RefCell::new(HarnessState {
            driven: [false; LINES],
            links,
            max_driven_at_once: 0,
        })))
    }

    pub fn short(self, drive: usize, sense: usize) -> Self {
        self.0.borrow_mut().links[drive][sense] = true;
        self
    }

    pub fn open(self, line: usize) -> Self {
        self.0.borrow_mut().links[line][line] = false;
        self
    }

    pub fn drive_pins(&self) -> [DrivePin; LINES] {
        core::array::from_fn(|i| DrivePin(self.clone(), i))
    }

    pub fn sense_pins(&self) -> [SensePin; LINES] {
        core::array::from_fn(|i| SensePin(self.clone(), i))
    }

    pub fn max_driven_at_once(&self) -> usize {
        self.0.borrow().max_driven_at_once
    }

    pub fn any_driven(&self) -> bool {
        self.0.borrow().driven.iter().any(|d| *d)
    }
}

pub struct DrivePin(SimHarness, usize);
pub struct SensePin(SimHarness, usize);

impl digital::ErrorType for DrivePin {
    type Error = Infallible;
}

impl OutputPin for DrivePin {
    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut h = (self.0).0.borrow_mut();
        h.driven[self.1] = true;
        let driven = h.driven.iter().filter(|d| **d).count();
        h.max_driven_at_once = h.max_driven_at_once.max(driven);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        (self.0).0.borrow_mut().driven[self.1] = false;
        Ok(())
    }
}

impl digital::ErrorType for SensePin {
    type Error = Infallible;
}

impl InputPin for SensePin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        let h = (self.0).0.borrow();
        Ok((0..LINES).any(|i| h.driven[i] && h.links[i][self.1]))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|v| !v)
    }
}

// ── Sensor bus ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    Write { address: u8, register: u8, bytes: Vec<u8> },
    Read { address: u8, register: u8 },
    Send { address: u8, bytes: Vec<u8> },
    Receive { address: u8 },
}

/// Register-map bus. Reads of unmapped registers NACK, as an absent
/// device would.
#[derive(Default)]
pub struct MockBus {
    registers: HashMap<(u8, u8), Vec<u8>>,
    /// Raw responses served to `receive`, in order.
    pub responses: VecDeque<Result<Vec<u8>, BusError>>,
    /// Errors injected ahead of the next transactions.
    pub failures: VecDeque<BusError>,
    pub ops: Vec<BusOp>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, address: u8, register: u8, bytes: &[u8]) {
        self.registers.insert((address, register), bytes.to_vec());
    }

    pub fn sends_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Send { address: a, bytes } if *a == address => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn writes_to(&self, address: u8) -> Vec<(u8, Vec<u8>)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Write { address: a, register, bytes } if *a == address => {
                    Some((*register, bytes.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn inject(&mut self) -> Result<(), BusError> {
        match self.failures.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl BusChannel for MockBus {
    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.ops.push(BusOp::Write { address, register, bytes: bytes.to_vec() });
        self.inject()
    }

    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.ops.push(BusOp::Read { address, register });
        self.inject()?;
        let data = self.registers.get(&(address, register)).ok_or(BusError::Nack)?;
        for (dst, src) in buf.iter_mut().zip(data) {
            *dst = *src;
        }
        Ok(())
    }

    fn send(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.ops.push(BusOp::Send { address, bytes: bytes.to_vec() });
        self.inject()
    }

    fn receive(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.ops.push(BusOp::Receive { address });
        self.inject()?;
        let data = self.responses.pop_front().unwrap_or(Err(BusError::Nack))?;
        buf.copy_from_slice(&data[..buf.len()]);
        Ok(())
    }
}

// ── Device images ─────────────────────────────────────────────

pub const INA226: u8 = 0x40;
pub const SCD41: u8 = 0x62;
pub const TSL2591: u8 = 0x29;
pub const BME280: u8 = 0x76;

/// INA226 reporting 5 V on the bus and 50 mA through the shunt.
#[allow(dead_code)]
pub fn install_ina226(bus: &mut MockBus) {
    bus.set(INA226, 0xFE, &[0x54, 0x49]);
    bus.set(INA226, 0x01, &[0x00, 0x64]);
    bus.set(INA226, 0x02, &[0x0F, 0xA0]);
    bus.set(INA226, 0x03, &[0x00, 0x0A]);
    bus.set(INA226, 0x04, &[0x01, 0xF4]);
}

/// BME280 loaded with the datasheet trimming example.
#[allow(dead_code)]
pub fn install_bme280(bus: &mut MockBus) {
    let words: [u16; 12] = [
        27504,
        26435,
        (-1000i16) as u16,
        36477,
        (-10685i16) as u16,
        3024,
        2855,
        140,
        (-7i16) as u16,
        15500,
        (-14600i16) as u16,
        6000,
    ];
    let mut tp = [0u8; 26];
    for (i, w) in words.iter().enumerate() {
        tp[i * 2..i * 2 + 2].copy_from_slice(&w.to_le_bytes());
    }
    tp[25] = 75; // H1
    // H2 = 362, H3 = 0, H4 = 324, H5 = 50, H6 = 30
    let h = [0x6A, 0x01, 0x00, 0x14, 0x24, 0x03, 0x1E];

    bus.set(BME280, 0xD0, &[0x60]);
    bus.set(BME280, 0x88, &tp);
    bus.set(BME280, 0xE1, &h);
    bus.set(BME280, 0xF7, &[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x6C, 0x3A]);
}

#[allow(dead_code)]
pub fn install_tsl2591(bus: &mut MockBus, full: u16, ir: u16) {
    bus.set(TSL2591, 0xB4, &full.to_le_bytes());
    bus.set(TSL2591, 0xB6, &ir.to_le_bytes());
}

/// One SCD41 read-measurement response: 500 ppm, 25 C, 50 %RH.
#[allow(dead_code)]
pub fn scd41_frame() -> Vec<u8> {
    [500u16, 0x6667, 0x8000]
        .iter()
        .flat_map(|w| {
            let [hi, lo] = w.to_be_bytes();
            [hi, lo, sensirion_crc8(&[hi, lo])]
        })
        .collect()
}

/// A response whose first CRC byte is wrong.
#[allow(dead_code)]
pub fn scd41_corrupt_frame() -> Vec<u8> {
    let mut frame = scd41_frame();
    frame[2] ^= 0xFF;
    frame
}

// ── Recorders ─────────────────────────────────────────────────

/// Delay that records each requested wait in milliseconds.
#[derive(Default)]
pub struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

#[allow(dead_code)]
impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.waits_ms.iter().map(|w| u64::from(*w)).sum()
    }

    pub fn count(&self, ms: u32) -> usize {
        self.waits_ms.iter().filter(|w| **w == ms).count()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

#[derive(Default)]
pub struct RecordingIndicator {
    pub colours: Vec<Colour>,
}

#[allow(dead_code)]
impl RecordingIndicator {
    pub fn last(&self) -> Option<Colour> {
        self.colours.last().copied()
    }
}

impl IndicatorPort for RecordingIndicator {
    fn signal(&mut self, colour: Colour) {
        self.colours.push(colour);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<JigEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn poll_attempts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, JigEvent::PollAttempt { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &JigEvent) {
        self.events.push(*event);
    }
}
