// src/sensor/stc31c.rs

use super::{require_state, require_uninitialized, SensorMachine};
use crate::common::{
    address::I2cAddr,
    error::{ErrorContext, SensorError},
    hal_traits::{Status, Stc3xDriver},
    record::{Co2Info, Co2Measurement, CompensationSample, SensorInfo},
    timing,
    types::{LifecycleState, SensorKind},
};
use alloc::format;
use embedded_hal::delay::DelayNs;

/// Binary gas code for CO₂ in air, 0 to 40 vol%.
pub const BINARY_GAS_CO2_IN_AIR_40: u16 = 0x13;

const KIND: SensorKind = SensorKind::Co2;

/// Capability machine for the STC31-C CO₂ sensor.
///
/// Every read needs a temperature/humidity compensation pair supplied by the
/// caller; the machine keeps no "last known" compensation values.
#[derive(Debug)]
pub struct Stc31cSensor<DRV, D>
where
    DRV: Stc3xDriver,
    D: DelayNs,
{
    driver: DRV,
    delay: D,
    self_calibration: bool,
    state: LifecycleState,
}

impl<DRV, D> Stc31cSensor<DRV, D>
where
    DRV: Stc3xDriver,
    D: DelayNs,
{
    pub fn new(driver: DRV, delay: D, self_calibration: bool) -> Self {
        Stc31cSensor {
            driver,
            delay,
            self_calibration,
            state: LifecycleState::Uninitialized,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn self_calibration(&self) -> bool {
        self.self_calibration
    }

    pub fn driver(&self) -> &DRV {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut DRV {
        &mut self.driver
    }

    // --- Lifecycle ---

    /// Bus init, address init, binary gas, then self-calibration.
    ///
    /// Steps that already succeeded are not undone when a later one fails;
    /// the machine drops back to `Uninitialized`.
    pub fn initialize(&mut self) -> Result<(), SensorError> {
        require_uninitialized(KIND, self.state)?;
        self.state = LifecycleState::Initializing;

        match self.run_init_sequence() {
            Ok(()) => {
                self.state = LifecycleState::Ready;
                log::info!("{} initialized (self-calibration: {})", KIND, self.self_calibration);
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Uninitialized;
                Err(e)
            }
        }
    }

    fn run_init_sequence(&mut self) -> Result<(), SensorError> {
        self.driver
            .i2c_hal_init()
            .map_err(|s| init_step("sensirion_i2c_hal_init", "i2c_hal_init", s))?;

        let address = I2cAddr::STC31C;
        self.driver
            .init(address.as_u8())
            .map_err(|s| init_step("stc3x_init", "sensor_init", s).with_detail("address", address.as_u8()))?;

        self.driver
            .set_binary_gas(BINARY_GAS_CO2_IN_AIR_40)
            .map_err(|s| {
                init_step("stc3x_set_binary_gas", "binary_gas", s)
                    .with_detail("gas_config", BINARY_GAS_CO2_IN_AIR_40)
            })?;

        let asc = if self.self_calibration {
            self.driver.enable_automatic_self_calibration()
        } else {
            self.driver.disable_automatic_self_calibration()
        };
        asc.map_err(|s| {
            init_step(asc_operation(self.self_calibration), "self_calibration", s)
        })?;
        timing::settle(&mut self.delay, timing::STC31C_ASC_SETTLE);

        timing::settle(&mut self.delay, timing::STC31C_POST_INIT_SETTLE);
        Ok(())
    }

    // --- Measurement ---

    /// Writes humidity then temperature compensation, then measures.
    ///
    /// A missing or non-finite compensation value fails with
    /// [`SensorError::Argument`] before any bus command is sent.
    pub fn read(
        &mut self,
        temperature: Option<f32>,
        humidity: Option<f32>,
    ) -> Result<Co2Measurement, SensorError> {
        require_state(KIND, "read", self.state, &[LifecycleState::Ready])?;

        let humidity = require_argument("humidity", humidity)?;
        let temperature = require_argument("temperature", temperature)?;

        self.driver.set_relative_humidity(humidity).map_err(|s| {
            SensorError::device(KIND, "stc3x_set_relative_humidity", s)
                .with_detail("humidity", humidity)
        })?;
        self.driver.set_temperature(temperature).map_err(|s| {
            SensorError::device(KIND, "stc3x_set_temperature", s)
                .with_detail("temperature", temperature)
        })?;
        let (gas_vol_percent, sensor_temperature) = self
            .driver
            .measure_gas_concentration()
            .map_err(|s| SensorError::device(KIND, "stc3x_measure_gas_concentration", s))?;

        Ok(Co2Measurement::from_vol_percent(gas_vol_percent, sensor_temperature))
    }

    /// Same as [`read`](Self::read), consuming a sample from this cycle's
    /// temperature/humidity read.
    pub fn read_compensated(
        &mut self,
        sample: CompensationSample,
    ) -> Result<Co2Measurement, SensorError> {
        self.read(Some(sample.temperature()), Some(sample.relative_humidity()))
    }

    // --- Identification ---

    pub fn get_info(&mut self) -> Result<Co2Info, SensorError> {
        require_state(KIND, "get_info", self.state, &[LifecycleState::Ready])?;
        let (product_id, serial) = self
            .driver
            .get_product_id()
            .map_err(|s| SensorError::device(KIND, "stc3x_get_product_id", s))?;
        Ok(Co2Info {
            product_id,
            serial_number: format!("{:X}", serial),
        })
    }

    // --- Calibration ---

    /// Forced recalibration against a known reference concentration (vol%).
    pub fn forced_recalibration(&mut self, reference_concentration: u16) -> Result<(), SensorError> {
        require_state(KIND, "forced_recalibration", self.state, &[LifecycleState::Ready])?;
        self.driver
            .forced_recalibration(reference_concentration)
            .map_err(|s| {
                SensorError::device(KIND, "stc3x_forced_recalibration", s)
                    .with_detail("reference_concentration", reference_concentration)
            })?;
        timing::settle(&mut self.delay, timing::STC31C_FRC_SETTLE);
        Ok(())
    }

    pub fn enable_automatic_self_calibration(&mut self) -> Result<(), SensorError> {
        self.set_self_calibration(true)
    }

    pub fn disable_automatic_self_calibration(&mut self) -> Result<(), SensorError> {
        self.set_self_calibration(false)
    }

    fn set_self_calibration(&mut self, enable: bool) -> Result<(), SensorError> {
        let operation = asc_operation(enable);
        require_state(KIND, operation, self.state, &[LifecycleState::Ready])?;
        let result = if enable {
            self.driver.enable_automatic_self_calibration()
        } else {
            self.driver.disable_automatic_self_calibration()
        };
        result.map_err(|s| SensorError::device(KIND, operation, s))?;
        timing::settle(&mut self.delay, timing::STC31C_ASC_SETTLE);
        self.self_calibration = enable;
        Ok(())
    }

    // --- Power ---

    pub fn sleep(&mut self) -> Result<(), SensorError> {
        require_state(KIND, "sleep", self.state, &[LifecycleState::Ready])?;
        self.driver
            .enter_sleep_mode()
            .map_err(|s| SensorError::device(KIND, "stc3x_enter_sleep_mode", s))?;
        self.state = LifecycleState::Sleeping;
        Ok(())
    }

    pub fn wake_up(&mut self) -> Result<(), SensorError> {
        require_state(KIND, "wake_up", self.state, &[LifecycleState::Sleeping])?;
        self.driver
            .exit_sleep_mode()
            .map_err(|s| SensorError::device(KIND, "stc3x_exit_sleep_mode", s))?;
        self.state = LifecycleState::Ready;
        Ok(())
    }

    /// The I²C HAL has no release primitive, so this only retires the machine.
    pub fn shutdown(&mut self) {
        if self.state != LifecycleState::Destroyed {
            self.state = LifecycleState::Destroyed;
            log::debug!("{} shut down", KIND);
        }
    }
}

impl<DRV, D> SensorMachine for Stc31cSensor<DRV, D>
where
    DRV: Stc3xDriver,
    D: DelayNs,
{
    fn kind(&self) -> SensorKind {
        KIND
    }

    fn state(&self) -> LifecycleState {
        self.state
    }

    fn get_info(&mut self) -> Result<SensorInfo, SensorError> {
        Stc31cSensor::get_info(self).map(SensorInfo::Co2)
    }

    fn sleep(&mut self) -> Result<(), SensorError> {
        Stc31cSensor::sleep(self)
    }

    fn wake_up(&mut self) -> Result<(), SensorError> {
        Stc31cSensor::wake_up(self)
    }

    fn shutdown(&mut self) -> Result<(), SensorError> {
        Stc31cSensor::shutdown(self);
        Ok(())
    }
}

fn asc_operation(enable: bool) -> &'static str {
    if enable {
        "stc3x_enable_automatic_self_calibration"
    } else {
        "stc3x_disable_automatic_self_calibration"
    }
}

fn init_step(operation: &'static str, step: &'static str, status: Status) -> SensorError {
    SensorError::init(KIND, operation, status).with_detail("step", step)
}

fn require_argument(argument: &'static str, value: Option<f32>) -> Result<f32, SensorError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(SensorError::Argument {
            argument,
            context: ErrorContext::new(KIND, "read"),
        }),
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::{DetailValue, ReadFailure};
    use crate::test_support::{Bus, MockDelay, MockStc3x};

    fn sensor(bus: &Bus, driver: MockStc3x, asc: bool) -> Stc31cSensor<MockStc3x, MockDelay> {
        Stc31cSensor::new(driver, MockDelay::new(bus), asc)
    }

    fn ready(bus: &Bus) -> Stc31cSensor<MockStc3x, MockDelay> {
        let mut s = sensor(bus, MockStc3x::new(bus), false);
        s.initialize().unwrap();
        bus.clear();
        s
    }

    #[test]
    fn test_initialize_sequence() {
        let bus = Bus::new();
        let mut s = sensor(&bus, MockStc3x::new(&bus), false);
        s.initialize().unwrap();

        assert_eq!(s.state(), LifecycleState::Ready);
        assert_eq!(
            bus.calls(),
            [
                "stc3x.i2c_hal_init",
                "stc3x.init",
                "stc3x.set_binary_gas",
                "stc3x.disable_automatic_self_calibration",
                "delay.10ms",
                "delay.50ms",
            ]
        );
        assert_eq!(s.driver().address, Some(0x29));
        assert_eq!(s.driver().binary_gas, Some(0x13));
    }

    #[test]
    fn test_initialize_with_self_calibration() {
        let bus = Bus::new();
        let mut s = sensor(&bus, MockStc3x::new(&bus), true);
        s.initialize().unwrap();
        assert!(bus.has("stc3x.enable_automatic_self_calibration"));
        assert!(!bus.has("stc3x.disable_automatic_self_calibration"));
    }

    #[test]
    fn test_initialize_failure_names_step_and_stays_uninitialized() {
        let bus = Bus::new();
        let driver = MockStc3x::new(&bus).failing("set_binary_gas", 7);
        let mut s = sensor(&bus, driver, false);

        let err = s.initialize().unwrap_err();
        assert!(matches!(err, SensorError::Initialization(_)));
        assert_eq!(err.status(), Some(7));
        assert_eq!(err.operation(), "stc3x_set_binary_gas");
        assert_eq!(err.detail("step"), Some(&DetailValue::from("binary_gas")));
        assert_eq!(s.state(), LifecycleState::Uninitialized);
        // Later steps were not attempted.
        assert!(!bus.has("stc3x.disable_automatic_self_calibration"));
    }

    #[test]
    fn test_initialize_twice_fails() {
        let bus = Bus::new();
        let mut s = ready(&bus);
        assert!(matches!(s.initialize(), Err(SensorError::Initialization(_))));
        assert_eq!(s.state(), LifecycleState::Ready);
    }

    #[test]
    fn test_read_converts_to_ppm() {
        let bus = Bus::new();
        let mut s = ready(&bus);
        let m = s.read(Some(25.0), Some(50.0)).unwrap();

        assert_eq!(m.co2_concentration, 1000.0);
        assert_eq!(m.temperature, 25.0);
        assert_eq!(
            bus.calls(),
            [
                "stc3x.set_relative_humidity",
                "stc3x.set_temperature",
                "stc3x.measure_gas_concentration",
            ]
        );
        assert_eq!(s.driver().humidity_written, Some(50.0));
        assert_eq!(s.driver().temperature_written, Some(25.0));
    }

    #[test]
    fn test_read_missing_argument_issues_no_command() {
        let bus = Bus::new();
        let mut s = ready(&bus);

        let err = s.read(Some(25.0), None).unwrap_err();
        assert!(matches!(err, SensorError::Argument { argument: "humidity", .. }));
        let err = s.read(None, Some(50.0)).unwrap_err();
        assert!(matches!(err, SensorError::Argument { argument: "temperature", .. }));
        let err = s.read(Some(f32::NAN), Some(50.0)).unwrap_err();
        assert!(matches!(err, SensorError::Argument { .. }));

        assert!(bus.calls().is_empty());
    }

    #[test]
    fn test_read_substep_failures() {
        let bus = Bus::new();
        let driver = MockStc3x::new(&bus).failing("set_temperature", 3);
        let mut s = sensor(&bus, driver, false);
        s.initialize().unwrap();

        let err = s.read(Some(21.5), Some(40.0)).unwrap_err();
        assert_eq!(err.read_failure(), Some(ReadFailure::Device));
        assert_eq!(err.operation(), "stc3x_set_temperature");
        assert_eq!(err.detail("temperature"), Some(&DetailValue::Float(21.5)));
        // Still operational.
        assert_eq!(s.state(), LifecycleState::Ready);
    }

    #[test]
    fn test_read_compensated_moves_sample() {
        let bus = Bus::new();
        let mut s = ready(&bus);
        let sample = CompensationSample::new(20.0, 30.0);
        s.read_compensated(sample).unwrap();
        assert_eq!(s.driver().temperature_written, Some(20.0));
        assert_eq!(s.driver().humidity_written, Some(30.0));
    }

    #[test]
    fn test_uninitialized_rejects_everything() {
        let bus = Bus::new();
        let mut s = sensor(&bus, MockStc3x::new(&bus), false);

        let checks = [
            s.read(Some(25.0), Some(50.0)).unwrap_err(),
            s.get_info().unwrap_err(),
            s.sleep().unwrap_err(),
            s.wake_up().unwrap_err(),
            s.forced_recalibration(400).unwrap_err(),
            s.enable_automatic_self_calibration().unwrap_err(),
        ];
        for err in checks {
            assert_eq!(err.read_failure(), Some(ReadFailure::Uninitialized));
        }
        // The guard runs before the argument check.
        let err = s.read(None, None).unwrap_err();
        assert_eq!(err.read_failure(), Some(ReadFailure::Uninitialized));
        assert!(bus.calls().is_empty());
    }

    #[test]
    fn test_info_serial_is_uppercase_hex() {
        let bus = Bus::new();
        let mut s = ready(&bus);
        let info = s.get_info().unwrap();
        assert_eq!(info.product_id, 0x0801_0301);
        assert_eq!(info.serial_number, "ABCDEF01234567");
    }

    #[test]
    fn test_sleep_wake_cycle() {
        let bus = Bus::new();
        let mut s = ready(&bus);

        s.sleep().unwrap();
        assert_eq!(s.state(), LifecycleState::Sleeping);

        let err = s.read(Some(25.0), Some(50.0)).unwrap_err();
        assert_eq!(
            err.read_failure(),
            Some(ReadFailure::InvalidState(LifecycleState::Sleeping))
        );
        assert!(s.sleep().is_err());

        s.wake_up().unwrap();
        assert_eq!(s.state(), LifecycleState::Ready);
        assert!(s.wake_up().is_err());
        assert_eq!(bus.calls(), ["stc3x.enter_sleep_mode", "stc3x.exit_sleep_mode"]);
    }

    #[test]
    fn test_calibration_settles() {
        let bus = Bus::new();
        let mut s = ready(&bus);

        s.forced_recalibration(400).unwrap();
        assert_eq!(s.driver().frc_reference, Some(400));
        s.enable_automatic_self_calibration().unwrap();
        assert!(s.self_calibration());

        assert_eq!(
            bus.calls(),
            [
                "stc3x.forced_recalibration",
                "delay.10ms",
                "stc3x.enable_automatic_self_calibration",
                "delay.10ms",
            ]
        );
    }

    #[test]
    fn test_failed_recalibration_skips_settle() {
        let bus = Bus::new();
        let driver = MockStc3x::new(&bus).failing("forced_recalibration", 2);
        let mut s = sensor(&bus, driver, false);
        s.initialize().unwrap();
        bus.clear();

        let err = s.forced_recalibration(400).unwrap_err();
        assert_eq!(err.detail("reference_concentration"), Some(&DetailValue::Int(400)));
        assert!(!bus.has("delay.10ms"));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let bus = Bus::new();
        let mut s = ready(&bus);
        s.shutdown();
        s.shutdown();
        assert_eq!(s.state(), LifecycleState::Destroyed);
        assert!(s.read(Some(1.0), Some(1.0)).is_err());
    }
}
