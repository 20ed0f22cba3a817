// src/sensor/shtc3.rs

use super::{require_state, require_uninitialized, SensorMachine};
use crate::common::{
    address::I2cAddr,
    error::SensorError,
    hal_traits::Sht4xDriver,
    record::{SensorInfo, TempHumidityInfo, TempHumidityMeasurement},
    timing,
    types::{LifecycleState, Precision, SensorKind},
};
use embedded_hal::delay::DelayNs;

const KIND: SensorKind = SensorKind::TempHumidity;

/// Capability machine for the SHTC3 temperature/humidity sensor.
///
/// Single-step init and no sleep mode on this driver path. It is the source
/// of the compensation sample for every CO₂ read.
#[derive(Debug)]
pub struct Shtc3Sensor<DRV, D>
where
    DRV: Sht4xDriver,
    D: DelayNs,
{
    driver: DRV,
    delay: D,
    address: I2cAddr,
    state: LifecycleState,
}

impl<DRV, D> Shtc3Sensor<DRV, D>
where
    DRV: Sht4xDriver,
    D: DelayNs,
{
    pub fn new(driver: DRV, delay: D) -> Self {
        Self::with_address(driver, delay, I2cAddr::SHTC3)
    }

    pub fn with_address(driver: DRV, delay: D, address: I2cAddr) -> Self {
        Shtc3Sensor {
            driver,
            delay,
            address,
            state: LifecycleState::Uninitialized,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn address(&self) -> I2cAddr {
        self.address
    }

    pub fn driver(&self) -> &DRV {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut DRV {
        &mut self.driver
    }

    pub fn initialize(&mut self) -> Result<(), SensorError> {
        require_uninitialized(KIND, self.state)?;
        self.state = LifecycleState::Initializing;

        if let Err(status) = self.driver.init(self.address.as_u8()) {
            self.state = LifecycleState::Uninitialized;
            return Err(SensorError::init(KIND, "sht4x_init", status)
                .with_detail("address", self.address.as_u8()));
        }

        self.state = LifecycleState::Ready;
        log::info!("{} initialized at {}", KIND, self.address);
        Ok(())
    }

    pub fn read(&mut self, precision: Precision) -> Result<TempHumidityMeasurement, SensorError> {
        require_state(KIND, "read", self.state, &[LifecycleState::Ready])?;
        let result = match precision {
            Precision::High => self.driver.measure_high_precision(),
            Precision::Medium => self.driver.measure_medium_precision(),
            Precision::Low => self.driver.measure_lowest_precision(),
        };
        let (temperature, relative_humidity) =
            result.map_err(|s| SensorError::device(KIND, precision.command(), s))?;
        Ok(TempHumidityMeasurement {
            temperature,
            relative_humidity,
        })
    }

    pub fn get_info(&mut self) -> Result<TempHumidityInfo, SensorError> {
        require_state(KIND, "get_info", self.state, &[LifecycleState::Ready])?;
        let serial_number = self
            .driver
            .serial_number()
            .map_err(|s| SensorError::device(KIND, "sht4x_serial_number", s))?;
        Ok(TempHumidityInfo { serial_number })
    }

    /// Soft reset, then wait for the sensor to reboot. The machine stays `Ready`.
    pub fn soft_reset(&mut self) -> Result<(), SensorError> {
        require_state(KIND, "soft_reset", self.state, &[LifecycleState::Ready])?;
        self.driver
            .soft_reset()
            .map_err(|s| SensorError::device(KIND, "sht4x_soft_reset", s))?;
        timing::settle(&mut self.delay, timing::SHTC3_SOFT_RESET_SETTLE);
        Ok(())
    }

    pub fn sleep(&mut self) -> Result<(), SensorError> {
        self.unsupported("sleep")
    }

    pub fn wake_up(&mut self) -> Result<(), SensorError> {
        self.unsupported("wake_up")
    }

    // An uninitialized machine still reports Uninitialized first.
    fn unsupported(&self, operation: &'static str) -> Result<(), SensorError> {
        require_state(
            KIND,
            operation,
            self.state,
            &[LifecycleState::Ready, LifecycleState::Sleeping, LifecycleState::Destroyed],
        )?;
        Err(SensorError::unsupported(KIND, operation))
    }

    pub fn shutdown(&mut self) {
        if self.state != LifecycleState::Destroyed {
            self.state = LifecycleState::Destroyed;
            log::debug!("{} shut down", KIND);
        }
    }
}

impl<DRV, D> SensorMachine for Shtc3Sensor<DRV, D>
where
    DRV: Sht4xDriver,
    D: DelayNs,
{
    fn kind(&self) -> SensorKind {
        KIND
    }

    fn state(&self) -> LifecycleState {
        self.state
    }

    fn get_info(&mut self) -> Result<SensorInfo, SensorError> {
        Shtc3Sensor::get_info(self).map(SensorInfo::TempHumidity)
    }

    fn sleep(&mut self) -> Result<(), SensorError> {
        Shtc3Sensor::sleep(self)
    }

    fn wake_up(&mut self) -> Result<(), SensorError> {
        Shtc3Sensor::wake_up(self)
    }

    fn shutdown(&mut self) -> Result<(), SensorError> {
        Shtc3Sensor::shutdown(self);
        Ok(())
    }
}
