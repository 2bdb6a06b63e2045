//! Light / environment sensor pair tested as one unit.
//!
//! The BME280 and TSL2591 sit on the same daughterboard, so the light test
//! passes only when both answer. Both are always read so the log names
//! every failed part.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::BusChannel;
use crate::config::LightConfig;
use crate::diagnostics::{HealthResult, SensorDiagnostic};

use super::bme280::Bme280;
use super::tsl2591::Tsl2591;

pub struct LightEnvironmentSensors {
    environment: Bme280,
    light: Tsl2591,
}

impl LightEnvironmentSensors {
    pub fn new(light: LightConfig) -> Self {
        Self {
            environment: Bme280::new(),
            light: Tsl2591::new(light),
        }
    }
}

impl SensorDiagnostic for LightEnvironmentSensors {
    fn name(&self) -> &'static str {
        "BME280 + TSL2591 pair"
    }

    fn check_health(&mut self, bus: &mut dyn BusChannel, delay: &mut dyn DelayNs) -> HealthResult {
        let environment = self.environment.read(bus, delay);
        if let Err(e) = &environment {
            warn!("light/env: BME280 not working ({})", e);
        }
        let light = self.light.read(bus, delay);
        if let Err(e) = &light {
            warn!("light/env: TSL2591 not working ({})", e);
        }

        let result = HealthResult::from_outcome(&environment).and(HealthResult::from_outcome(&light));
        if result.is_healthy() {
            info!("light/env: both sensors responding");
        }
        result
    }
}
