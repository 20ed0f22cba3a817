// src/coordinator/config.rs

use crate::common::{address::I2cAddr, types::Precision, types::SensorKind};

/// Construction-time options for a [`Coordinator`](super::Coordinator).
///
/// The transport location is not a field: drivers come from the
/// [`TransportProvider`](super::TransportProvider) passed alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoordinatorConfig {
    pub enable_co2_sensor: bool,
    /// Forced on whenever the CO₂ sensor is enabled.
    pub enable_temp_humidity_sensor: bool,
    pub enable_particulate_sensor: bool,
    pub co2_self_calibration: bool,
    pub auto_clean_interval_days: u8,
    /// Precision used for the temperature/humidity read of each cycle.
    pub temp_humidity_precision: Precision,
    pub temp_humidity_address: I2cAddr,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            enable_co2_sensor: true,
            enable_temp_humidity_sensor: true,
            enable_particulate_sensor: true,
            co2_self_calibration: false,
            auto_clean_interval_days: 4,
            temp_humidity_precision: Precision::High,
            temp_humidity_address: I2cAddr::SHTC3,
        }
    }
}

impl CoordinatorConfig {
    pub fn with_co2_sensor(mut self, enable: bool) -> Self {
        self.enable_co2_sensor = enable;
        self
    }

    pub fn with_temp_humidity_sensor(mut self, enable: bool) -> Self {
        self.enable_temp_humidity_sensor = enable;
        self
    }

    pub fn with_particulate_sensor(mut self, enable: bool) -> Self {
        self.enable_particulate_sensor = enable;
        self
    }

    pub fn with_co2_self_calibration(mut self, enable: bool) -> Self {
        self.co2_self_calibration = enable;
        self
    }

    pub fn with_auto_clean_interval_days(mut self, days: u8) -> Self {
        self.auto_clean_interval_days = days;
        self
    }

    pub fn with_temp_humidity_precision(mut self, precision: Precision) -> Self {
        self.temp_humidity_precision = precision;
        self
    }

    pub fn with_temp_humidity_address(mut self, address: I2cAddr) -> Self {
        self.temp_humidity_address = address;
        self
    }

    /// Applies the CO₂ ⇒ temperature/humidity dependency.
    ///
    /// Returns the effective config and `true` if the caller's choice for the
    /// temperature/humidity sensor was overridden.
    pub fn resolve(mut self) -> (Self, bool) {
        let overridden = self.enable_co2_sensor && !self.enable_temp_humidity_sensor;
        if overridden {
            self.enable_temp_humidity_sensor = true;
        }
        (self, overridden)
    }

    pub fn is_enabled(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Co2 => self.enable_co2_sensor,
            SensorKind::TempHumidity => self.enable_temp_humidity_sensor,
            SensorKind::Particulate => self.enable_particulate_sensor,
        }
    }
}
