// src/sensor/sps30.rs

use super::{require_state, require_uninitialized, SensorMachine};
use crate::common::{
    error::{ErrorContext, ReadFailure, SensorError},
    hal_traits::{Sps30Driver, Status, SPS30_ERR_NOT_ENOUGH_DATA, SPS30_MAX_SERIAL_LEN},
    record::{ParticulateInfo, ParticulateMeasurement, SensorInfo, VersionInfo},
    timing,
    types::{LifecycleState, MeasurementState, SensorKind},
};
use arrayvec::ArrayString;
use core::str;
use embedded_hal::delay::DelayNs;

const KIND: SensorKind = SensorKind::Particulate;

/// Capability machine for the SPS30 particulate-matter sensor on UART.
///
/// Besides the lifecycle state it tracks whether continuous measurement is
/// running and whether the UART is currently open. Sleep and wake-up are
/// gated on the firmware version cached during `initialize`.
#[derive(Debug)]
pub struct Sps30Sensor<DRV, D>
where
    DRV: Sps30Driver,
    D: DelayNs,
{
    driver: DRV,
    delay: D,
    state: LifecycleState,
    measurement: MeasurementState,
    uart_open: bool,
    version: Option<VersionInfo>,
    serial: Option<ArrayString<SPS30_MAX_SERIAL_LEN>>,
}

impl<DRV, D> Sps30Sensor<DRV, D>
where
    DRV: Sps30Driver,
    D: DelayNs,
{
    pub fn new(driver: DRV, delay: D) -> Self {
        Sps30Sensor {
            driver,
            delay,
            state: LifecycleState::Uninitialized,
            measurement: MeasurementState::Idle,
            uart_open: false,
            version: None,
            serial: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn measurement_state(&self) -> MeasurementState {
        self.measurement
    }

    pub fn is_measuring(&self) -> bool {
        self.measurement.is_active()
    }

    pub fn is_uart_open(&self) -> bool {
        self.uart_open
    }

    /// Versions cached by the last successful version read.
    pub fn version_info(&self) -> Option<VersionInfo> {
        self.version
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial.as_ref().map(|s| s.as_str())
    }

    /// Sleep/wake need firmware 2.0 or later. False until the version is known.
    pub fn supports_sleep(&self) -> bool {
        self.version.map_or(false, |v| v.supports_sleep())
    }

    pub fn driver(&self) -> &DRV {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut DRV {
        &mut self.driver
    }

    // --- Initialization ---

    /// Opens the UART, probes, caches version and serial, sets the fan
    /// auto-cleaning interval, starts measurement and waits for the first
    /// measurement to be buffered.
    ///
    /// Requires `Uninitialized` with the UART closed. A probe failure leaves
    /// the UART open; call [`close`](Self::close) before retrying.
    pub fn initialize(&mut self, auto_clean_interval_days: u8) -> Result<(), SensorError> {
        require_uninitialized(KIND, self.state)?;
        if self.uart_open {
            return Err(SensorError::Initialization(
                ErrorContext::new(KIND, "initialize").with_detail("uart", "open"),
            ));
        }
        self.state = LifecycleState::Initializing;

        match self.run_init_sequence(auto_clean_interval_days) {
            Ok(()) => {
                self.state = LifecycleState::Ready;
                log::info!(
                    "{} initialized (firmware {}, serial {})",
                    KIND,
                    self.version.map(|v| v.firmware_version()).unwrap_or_default(),
                    self.serial_number().unwrap_or("?")
                );
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Uninitialized;
                self.version = None;
                self.serial = None;
                Err(e)
            }
        }
    }

    fn run_init_sequence(&mut self, auto_clean_interval_days: u8) -> Result<(), SensorError> {
        self.driver
            .uart_open()
            .map_err(|s| init_step("sensirion_uart_open", "uart_open", s))?;
        self.uart_open = true;

        self.driver
            .probe()
            .map_err(|s| init_step("sps30_probe", "probe", s))?;

        let version = self
            .driver
            .read_version()
            .map_err(|s| read_step("sps30_read_version", "read_version", s))?;
        self.version = Some(version);

        let raw_serial = self
            .driver
            .get_serial()
            .map_err(|s| read_step("sps30_get_serial", "get_serial", s))?;
        self.serial = Some(parse_serial(&raw_serial)?);

        self.driver
            .set_fan_auto_cleaning_interval_days(auto_clean_interval_days)
            .map_err(|s| {
                read_step("sps30_set_fan_auto_cleaning_interval_days", "auto_clean_interval", s)
                    .with_detail("interval_days", auto_clean_interval_days)
            })?;

        self.driver
            .start_measurement()
            .map_err(|s| init_step("sps30_start_measurement", "start_measurement", s))?;
        self.measurement = MeasurementState::Active;

        timing::settle(&mut self.delay, timing::SPS30_MEASUREMENT_SETTLE);
        Ok(())
    }

    // --- Measurement ---

    /// Reads the latest buffered measurement.
    ///
    /// "Not enough data yet" comes back as [`ReadFailure::NotEnoughData`]
    /// (retryable), every other driver failure as [`ReadFailure::Device`].
    pub fn read(&mut self) -> Result<ParticulateMeasurement, SensorError> {
        self.require_measuring("read")?;
        self.driver.read_measurement().map_err(|status| {
            let reason = if status == SPS30_ERR_NOT_ENOUGH_DATA {
                ReadFailure::NotEnoughData
            } else {
                ReadFailure::Device
            };
            SensorError::Read {
                reason,
                context: ErrorContext::new(KIND, "sps30_read_measurement").with_status(status),
            }
        })
    }

    pub fn stop_measurement(&mut self) -> Result<(), SensorError> {
        self.require_measuring("stop_measurement")?;
        self.driver
            .stop_measurement()
            .map_err(|s| SensorError::device(KIND, "sps30_stop_measurement", s))?;
        self.measurement = MeasurementState::Idle;
        Ok(())
    }

    /// Restarts continuous measurement after a stop and waits for the first
    /// measurement to be buffered.
    pub fn start_measurement(&mut self) -> Result<(), SensorError> {
        require_state(KIND, "start_measurement", self.state, &[LifecycleState::Ready])?;
        if self.measurement.is_active() {
            return Err(SensorError::state(
                KIND,
                "start_measurement",
                ReadFailure::MeasurementActive,
            ));
        }
        self.driver
            .start_measurement()
            .map_err(|s| SensorError::device(KIND, "sps30_start_measurement", s))?;
        self.measurement = MeasurementState::Active;
        timing::settle(&mut self.delay, timing::SPS30_MEASUREMENT_SETTLE);
        Ok(())
    }

    // --- Maintenance ---

    pub fn start_manual_fan_cleaning(&mut self) -> Result<(), SensorError> {
        self.require_measuring("start_manual_fan_cleaning")?;
        self.driver
            .start_manual_fan_cleaning()
            .map_err(|s| SensorError::device(KIND, "sps30_start_manual_fan_cleaning", s))
    }

    pub fn get_fan_auto_cleaning_interval_days(&mut self) -> Result<u8, SensorError> {
        require_state(
            KIND,
            "get_fan_auto_cleaning_interval_days",
            self.state,
            &[LifecycleState::Ready],
        )?;
        self.driver
            .get_fan_auto_cleaning_interval_days()
            .map_err(|s| SensorError::device(KIND, "sps30_get_fan_auto_cleaning_interval_days", s))
    }

    pub fn set_fan_auto_cleaning_interval_days(&mut self, days: u8) -> Result<(), SensorError> {
        require_state(
            KIND,
            "set_fan_auto_cleaning_interval_days",
            self.state,
            &[LifecycleState::Ready],
        )?;
        self.driver
            .set_fan_auto_cleaning_interval_days(days)
            .map_err(|s| {
                SensorError::device(KIND, "sps30_set_fan_auto_cleaning_interval_days", s)
                    .with_detail("interval_days", days)
            })
    }

    /// Device reset. Continuous measurement is stopped by the reset.
    pub fn reset(&mut self) -> Result<(), SensorError> {
        require_state(KIND, "reset", self.state, &[LifecycleState::Ready])?;
        self.driver
            .reset()
            .map_err(|s| SensorError::device(KIND, "sps30_reset", s))?;
        self.measurement = MeasurementState::Idle;
        Ok(())
    }

    // --- Identification ---

    /// Returns the version and serial cached during `initialize`; no bus
    /// traffic, so it also works while sleeping.
    pub fn get_info(&self) -> Result<ParticulateInfo, SensorError> {
        require_state(
            KIND,
            "get_info",
            self.state,
            &[LifecycleState::Ready, LifecycleState::Sleeping],
        )?;
        match (self.version, self.serial) {
            (Some(version), Some(serial_number)) => Ok(ParticulateInfo {
                version,
                serial_number,
            }),
            _ => Err(SensorError::state(KIND, "get_info", ReadFailure::InvalidData)),
        }
    }

    // --- Power ---

    /// Puts the sensor to sleep. Measurement must be stopped first; this
    /// never stops it implicitly. A no-op below firmware 2.0.
    pub fn sleep(&mut self) -> Result<(), SensorError> {
        require_state(
            KIND,
            "sleep",
            self.state,
            &[LifecycleState::Ready, LifecycleState::Sleeping],
        )?;
        if !self.supports_sleep() {
            log::debug!("{} sleep ignored: firmware has no sleep mode", KIND);
            return Ok(());
        }
        require_state(KIND, "sleep", self.state, &[LifecycleState::Ready])?;
        if self.measurement.is_active() {
            return Err(SensorError::state(KIND, "sleep", ReadFailure::MeasurementActive));
        }
        self.driver
            .sleep()
            .map_err(|s| SensorError::device(KIND, "sps30_sleep", s))?;
        self.state = LifecycleState::Sleeping;
        Ok(())
    }

    /// Wakes the sensor. Measurement stays stopped. A no-op below firmware 2.0.
    pub fn wake_up(&mut self) -> Result<(), SensorError> {
        require_state(
            KIND,
            "wake_up",
            self.state,
            &[LifecycleState::Ready, LifecycleState::Sleeping],
        )?;
        if !self.supports_sleep() {
            log::debug!("{} wake-up ignored: firmware has no sleep mode", KIND);
            return Ok(());
        }
        require_state(KIND, "wake_up", self.state, &[LifecycleState::Sleeping])?;
        self.driver
            .wake_up()
            .map_err(|s| SensorError::device(KIND, "sps30_wake_up", s))?;
        self.state = LifecycleState::Ready;
        Ok(())
    }

    // --- Teardown ---

    /// Releases the UART. Safe to call at any time, including after a failed
    /// `initialize`, and a no-op once closed.
    ///
    /// The UART counts as released even when the driver reports an error.
    pub fn close(&mut self) -> Result<(), SensorError> {
        if !self.uart_open {
            return Ok(());
        }
        let result = self.driver.uart_close();
        self.uart_open = false;
        self.measurement = MeasurementState::Idle;
        if self.state != LifecycleState::Uninitialized {
            self.state = LifecycleState::Destroyed;
        }
        result.map_err(|s| SensorError::device(KIND, "sensirion_uart_close", s))
    }

    /// Stops an active measurement, then closes the UART. Both steps are
    /// attempted; the first error is returned.
    pub fn shutdown(&mut self) -> Result<(), SensorError> {
        let stopped = if self.measurement.is_active() && self.state == LifecycleState::Ready {
            self.stop_measurement()
        } else {
            Ok(())
        };
        let closed = self.close();
        if self.state != LifecycleState::Destroyed {
            self.state = LifecycleState::Destroyed;
            log::debug!("{} shut down", KIND);
        }
        stopped.and(closed)
    }

    fn require_measuring(&self, operation: &'static str) -> Result<(), SensorError> {
        require_state(KIND, operation, self.state, &[LifecycleState::Ready])?;
        if !self.measurement.is_active() {
            return Err(SensorError::state(KIND, operation, ReadFailure::MeasurementInactive));
        }
        Ok(())
    }
}

impl<DRV, D> SensorMachine for Sps30Sensor<DRV, D>
where
    DRV: Sps30Driver,
    D: DelayNs,
{
    fn kind(&self) -> SensorKind {
        KIND
    }

    fn state(&self) -> LifecycleState {
        self.state
    }

    fn sleep_effective(&self) -> bool {
        self.supports_sleep()
    }

    fn get_info(&mut self) -> Result<SensorInfo, SensorError> {
        Sps30Sensor::get_info(self).map(SensorInfo::Particulate)
    }

    fn sleep(&mut self) -> Result<(), SensorError> {
        Sps30Sensor::sleep(self)
    }

    fn wake_up(&mut self) -> Result<(), SensorError> {
        Sps30Sensor::wake_up(self)
    }

    fn shutdown(&mut self) -> Result<(), SensorError> {
        Sps30Sensor::shutdown(self)
    }
}

fn init_step(operation: &'static str, step: &'static str, status: Status) -> SensorError {
    SensorError::init(KIND, operation, status).with_detail("step", step)
}

fn read_step(operation: &'static str, step: &'static str, status: Status) -> SensorError {
    SensorError::device(KIND, operation, status).with_detail("step", step)
}

/// The driver fills a fixed buffer with NUL-terminated ASCII.
fn parse_serial(
    raw: &[u8; SPS30_MAX_SERIAL_LEN],
) -> Result<ArrayString<SPS30_MAX_SERIAL_LEN>, SensorError> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let invalid = || {
        SensorError::state(KIND, "sps30_get_serial", ReadFailure::InvalidData)
            .with_detail("step", "get_serial")
    };
    let text = str::from_utf8(&raw[..end]).map_err(|_| invalid())?;
    if !text.is_ascii() {
        return Err(invalid());
    }
    ArrayString::from(text).map_err(|_| invalid())
}
