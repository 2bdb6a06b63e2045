//! Dual-pass continuity / crossing scan of a wiring harness.
//!
//! The jig drives one end of every wire (drive lines, push-pull outputs)
//! and samples the other end (sense lines, inputs with pull-down). Drive
//! line `i` is paired with sense line `i`.
//!
//! ```text
//!   conduction pass   for i: drive i high ─ settle ─ read sense i        ─ drive i low ─ settle
//!   crossing pass     for i: drive i high ─ settle ─ read sense j (j≠i)  ─ drive i low ─ settle
//! ```
//!
//! Exactly one drive line is high at any time, so an off-diagonal high
//! reading is unambiguous proof of a cross. Both passes always run to the
//! end so the report names every open line and every crossed pair.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{info, warn};

use crate::app::ports::BusChannel;
use crate::error::{SensorFault, WiringFault};

use super::{HealthResult, SensorDiagnostic};

/// Sense line `sense` went high while only drive line `drive` was high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub drive: usize,
    pub sense: usize,
}

/// NxN grid of observations: `cell(i, j)` is true when sense line `j` read
/// high while drive line `i` was driven. Built fresh by every scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuityMatrix<const N: usize> {
    cells: [[bool; N]; N],
}

impl<const N: usize> ContinuityMatrix<N> {
    pub fn new() -> Self {
        Self {
            cells: [[false; N]; N],
        }
    }

    pub fn record(&mut self, drive: usize, sense: usize, high: bool) {
        self.cells[drive][sense] = high;
    }

    pub fn cell(&self, drive: usize, sense: usize) -> bool {
        self.cells[drive][sense]
    }

    /// Per-wire conduction result (the diagonal).
    pub fn conducted(&self) -> [bool; N] {
        core::array::from_fn(|i| self.cells[i][i])
    }

    pub fn all_conduct(&self) -> bool {
        (0..N).all(|i| self.cells[i][i])
    }

    /// Indices of the wires that failed the conduction pass.
    pub fn open_lines(&self) -> heapless::Vec<usize, N> {
        (0..N).filter(|&i| !self.cells[i][i]).collect()
    }

    /// Every off-diagonal high reading, in drive-then-sense order.
    pub fn crossings(&self) -> impl Iterator<Item = Crossing> + '_ {
        (0..N).flat_map(move |drive| {
            (0..N)
                .filter(move |&sense| sense != drive && self.cells[drive][sense])
                .map(move |sense| Crossing { drive, sense })
        })
    }

    pub fn has_crossing(&self) -> bool {
        self.crossings().next().is_some()
    }

    /// `None` when every wire conducts and nothing crosses.
    pub fn fault(&self) -> Option<WiringFault> {
        WiringFault::classify(self.all_conduct(), self.has_crossing())
    }
}

impl<const N: usize> Default for ContinuityMatrix<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the drive and sense lines of an N-wire harness.
pub struct ContinuityScanner<O, I, const N: usize> {
    drive: [O; N],
    sense: [I; N],
    settle_ms: u32,
}

impl<O: OutputPin, I: InputPin, const N: usize> ContinuityScanner<O, I, N> {
    pub fn new(drive: [O; N], sense: [I; N], settle_ms: u32) -> Self {
        Self {
            drive,
            sense,
            settle_ms,
        }
    }

    /// Run both passes and return the full observation grid.
    pub fn scan(&mut self, delay: &mut dyn DelayNs) -> Result<ContinuityMatrix<N>, SensorFault> {
        let mut matrix = ContinuityMatrix::new();
        self.release_all()?;

        // Conduction pass: paired sense line only.
        for i in 0..N {
            self.drive_high(i, delay)?;
            let high = self.sense_high(i);
            self.drive_low(i, delay)?;
            matrix.record(i, i, high?);
        }

        // Crossing pass: every other sense line.
        for i in 0..N {
            self.drive_high(i, delay)?;
            let mut readings = [false; N];
            let mut failed = None;
            for (j, reading) in readings.iter_mut().enumerate() {
                if j == i {
                    continue;
                }
                match self.sense_high(j) {
                    Ok(high) => *reading = high,
                    Err(fault) => failed = Some(fault),
                }
            }
            self.drive_low(i, delay)?;
            if let Some(fault) = failed {
                return Err(fault);
            }
            for (j, &high) in readings.iter().enumerate() {
                if j != i {
                    matrix.record(i, j, high);
                }
            }
        }

        Ok(matrix)
    }

    /// Drive every line low so the scan starts from a known state.
    pub fn release_all(&mut self) -> Result<(), SensorFault> {
        for line in &mut self.drive {
            line.set_low()
                .map_err(|_| SensorFault::MissingChannel("drive line"))?;
        }
        Ok(())
    }

    fn drive_high(&mut self, i: usize, delay: &mut dyn DelayNs) -> Result<(), SensorFault> {
        self.drive[i]
            .set_high()
            .map_err(|_| SensorFault::MissingChannel("drive line"))?;
        delay.delay_ms(self.settle_ms);
        Ok(())
    }

    fn drive_low(&mut self, i: usize, delay: &mut dyn DelayNs) -> Result<(), SensorFault> {
        self.drive[i]
            .set_low()
            .map_err(|_| SensorFault::MissingChannel("drive line"))?;
        delay.delay_ms(self.settle_ms);
        Ok(())
    }

    fn sense_high(&mut self, j: usize) -> Result<bool, SensorFault> {
        self.sense[j]
            .is_high()
            .map_err(|_| SensorFault::MissingChannel("sense line"))
    }
}

/// Harness diagnostic: healthy iff every wire conducts and nothing crosses.
pub struct WiringHarness<O, I, const N: usize> {
    scanner: ContinuityScanner<O, I, N>,
    last_scan: Option<ContinuityMatrix<N>>,
}

impl<O: OutputPin, I: InputPin, const N: usize> WiringHarness<O, I, N> {
    pub fn new(scanner: ContinuityScanner<O, I, N>) -> Self {
        Self {
            scanner,
            last_scan: None,
        }
    }

    /// Matrix from the most recent completed scan.
    pub fn last_scan(&self) -> Option<&ContinuityMatrix<N>> {
        self.last_scan.as_ref()
    }

    fn report(matrix: &ContinuityMatrix<N>) {
        for (i, ok) in matrix.conducted().iter().enumerate() {
            if *ok {
                info!("harness: cable {} conducts", i + 1);
            }
        }
        let open = matrix.open_lines();
        if !open.is_empty() {
            warn!("harness: open lines {:?}", open.as_slice());
        }
        for c in matrix.crossings() {
            warn!(
                "harness: crossing between drive line {} and sense line {}",
                c.drive, c.sense
            );
        }
    }
}

impl<O: OutputPin, I: InputPin, const N: usize> SensorDiagnostic for WiringHarness<O, I, N> {
    fn name(&self) -> &'static str {
        "wiring harness"
    }

    fn check_health(&mut self, _bus: &mut dyn BusChannel, delay: &mut dyn DelayNs) -> HealthResult {
        self.last_scan = None;
        let matrix = match self.scanner.scan(delay) {
            Ok(m) => m,
            Err(fault) => {
                warn!("harness: scan aborted ({})", fault);
                return HealthResult::Unhealthy(fault.into());
            }
        };

        Self::report(&matrix);
        self.last_scan = Some(matrix);

        match matrix.fault() {
            None => {
                info!("harness: all cables conduct, no crossings");
                HealthResult::Healthy
            }
            Some(fault) => HealthResult::Unhealthy(fault.into()),
        }
    }
}
