// src/coordinator/mod.rs

// The orchestration layer: owns up to three capability machines, initializes
// them in dependency order, threads the compensation sample from the SHTC3
// read into the CO₂ read, and runs bulk operations that collect one outcome
// per sensor instead of stopping at the first failure.

pub mod config;
pub mod report;

pub use config::CoordinatorConfig;
pub use report::{BatchReport, BulkOperation, Outcome, ReadCycle, SkipReason};

use crate::common::{
    error::SensorError,
    hal_traits::{Sht4xDriver, Sps30Driver, Stc3xDriver},
    record::{InfoSet, ReadingSet},
    types::{LifecycleState, SensorKind},
};
use crate::sensor::{SensorMachine, Shtc3Sensor, Sps30Sensor, Stc31cSensor};
use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;

/// Hands out the transport drivers for the enabled sensors.
///
/// Called once per enabled kind during [`Coordinator::new`], never for a
/// disabled kind.
pub trait TransportProvider {
    type Co2: Stc3xDriver;
    type TempHumidity: Sht4xDriver;
    type Particulate: Sps30Driver;

    fn co2_driver(&mut self) -> Self::Co2;

    fn temp_humidity_driver(&mut self) -> Self::TempHumidity;

    fn particulate_driver(&mut self) -> Self::Particulate;
}

/// Owner of the sensor set.
///
/// A `Coordinator` only exists fully initialized: [`new`](Self::new) either
/// brings every enabled sensor to `Ready` or shuts down whatever it started
/// and returns the original error.
pub struct Coordinator<P, D>
where
    P: TransportProvider,
    D: DelayNs + Clone,
{
    config: CoordinatorConfig,
    co2: Option<Stc31cSensor<P::Co2, D>>,
    temp_humidity: Option<Shtc3Sensor<P::TempHumidity, D>>,
    particulate: Option<Sps30Sensor<P::Particulate, D>>,
    /// Set when `sleep_all` stopped the particulate measurement, so that
    /// `wake_up_all` restarts it.
    particulate_paused: bool,
    shut_down: bool,
}

impl<P, D> Coordinator<P, D>
where
    P: TransportProvider,
    D: DelayNs + Clone,
{
    /// Builds and initializes the enabled sensors: SHTC3, then STC31-C, then
    /// SPS30.
    pub fn new(config: CoordinatorConfig, mut transports: P, delay: D) -> Result<Self, SensorError> {
        let (config, overridden) = config.resolve();
        if overridden {
            log::warn!(
                "{} enabled because {} needs it for compensation",
                SensorKind::TempHumidity,
                SensorKind::Co2
            );
        }

        let temp_humidity = config.enable_temp_humidity_sensor.then(|| {
            Shtc3Sensor::with_address(
                transports.temp_humidity_driver(),
                delay.clone(),
                config.temp_humidity_address,
            )
        });
        let co2 = config.enable_co2_sensor.then(|| {
            Stc31cSensor::new(
                transports.co2_driver(),
                delay.clone(),
                config.co2_self_calibration,
            )
        });
        let particulate = config
            .enable_particulate_sensor
            .then(|| Sps30Sensor::new(transports.particulate_driver(), delay.clone()));

        let mut hub = Coordinator {
            config,
            co2,
            temp_humidity,
            particulate,
            particulate_paused: false,
            shut_down: false,
        };

        if let Err(e) = hub.initialize_all() {
            log::warn!("sensor setup failed, releasing started sensors: {}", e);
            hub.shutdown();
            return Err(e);
        }
        log::info!("sensor hub ready ({} sensors)", hub.enabled().len());
        Ok(hub)
    }

    fn initialize_all(&mut self) -> Result<(), SensorError> {
        if let Some(th) = self.temp_humidity.as_mut() {
            th.initialize()?;
        }
        if let Some(co2) = self.co2.as_mut() {
            co2.initialize()?;
        }
        if let Some(pm) = self.particulate.as_mut() {
            pm.initialize(self.config.auto_clean_interval_days)?;
        }
        Ok(())
    }

    /// The effective configuration, after dependency resolution.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Enabled kinds in info/read order.
    pub fn enabled(&self) -> Vec<SensorKind> {
        SensorKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    pub fn is_enabled(&self, kind: SensorKind) -> bool {
        self.config.is_enabled(kind)
    }

    pub fn state(&self, kind: SensorKind) -> Option<LifecycleState> {
        match kind {
            SensorKind::Co2 => self.co2.as_ref().map(|m| m.state()),
            SensorKind::TempHumidity => self.temp_humidity.as_ref().map(|m| m.state()),
            SensorKind::Particulate => self.particulate.as_ref().map(|m| m.state()),
        }
    }

    // --- Per-sensor access for administrative calls ---

    pub fn co2(&self) -> Option<&Stc31cSensor<P::Co2, D>> {
        self.co2.as_ref()
    }

    pub fn co2_mut(&mut self) -> Option<&mut Stc31cSensor<P::Co2, D>> {
        self.co2.as_mut()
    }

    pub fn temp_humidity(&self) -> Option<&Shtc3Sensor<P::TempHumidity, D>> {
        self.temp_humidity.as_ref()
    }

    pub fn temp_humidity_mut(&mut self) -> Option<&mut Shtc3Sensor<P::TempHumidity, D>> {
        self.temp_humidity.as_mut()
    }

    pub fn particulate(&self) -> Option<&Sps30Sensor<P::Particulate, D>> {
        self.particulate.as_ref()
    }

    pub fn particulate_mut(&mut self) -> Option<&mut Sps30Sensor<P::Particulate, D>> {
        self.particulate.as_mut()
    }

    fn machine_mut(&mut self, kind: SensorKind) -> Option<&mut dyn SensorMachine> {
        match kind {
            SensorKind::Co2 => self.co2.as_mut().map(|m| m as &mut dyn SensorMachine),
            SensorKind::TempHumidity => self
                .temp_humidity
                .as_mut()
                .map(|m| m as &mut dyn SensorMachine),
            SensorKind::Particulate => self
                .particulate
                .as_mut()
                .map(|m| m as &mut dyn SensorMachine),
        }
    }

    // --- Reads ---

    /// One read cycle: temperature/humidity first, its sample moved into the
    /// CO₂ read, then particulate. Failures are recorded in the report and
    /// leave the corresponding key out of the readings.
    pub fn read_cycle(&mut self) -> ReadCycle {
        let mut readings = ReadingSet::new();
        let mut report = BatchReport::new(BulkOperation::Read);
        let mut sample = None;

        if let Some(th) = self.temp_humidity.as_mut() {
            match th.read(self.config.temp_humidity_precision) {
                Ok(m) => {
                    sample = Some(m.compensation());
                    readings.insert(m.into());
                    report.push(SensorKind::TempHumidity, Outcome::Done);
                }
                Err(e) => report.push(SensorKind::TempHumidity, Outcome::Failed(e)),
            }
        }

        if let Some(co2) = self.co2.as_mut() {
            match sample.take() {
                Some(sample) => match co2.read_compensated(sample) {
                    Ok(m) => {
                        readings.insert(m.into());
                        report.push(SensorKind::Co2, Outcome::Done);
                    }
                    Err(e) => report.push(SensorKind::Co2, Outcome::Failed(e)),
                },
                None => {
                    log::error!(
                        "{} read skipped: no {} sample this cycle",
                        SensorKind::Co2,
                        SensorKind::TempHumidity
                    );
                    report.push(
                        SensorKind::Co2,
                        Outcome::Skipped(SkipReason::MissingCompensation),
                    );
                }
            }
        }

        if let Some(pm) = self.particulate.as_mut() {
            match pm.read() {
                Ok(m) => {
                    readings.insert(m.into());
                    report.push(SensorKind::Particulate, Outcome::Done);
                }
                Err(e) => report.push(SensorKind::Particulate, Outcome::Failed(e)),
            }
        }

        ReadCycle { readings, report }
    }

    /// Readings of every sensor that answered this cycle.
    pub fn read_all(&mut self) -> ReadingSet {
        self.read_cycle().readings
    }

    /// Identification of every sensor that answered.
    pub fn get_all_info(&mut self) -> InfoSet {
        let mut infos = InfoSet::new();
        for kind in SensorKind::ALL {
            let Some(machine) = self.machine_mut(kind) else {
                continue;
            };
            match machine.get_info() {
                Ok(info) => {
                    infos.insert(kind, info);
                }
                Err(e) => log::warn!("{} get_info failed: {}", kind, e),
            }
        }
        infos
    }

    // --- Bulk power management ---

    /// Puts every sensor that can sleep to sleep.
    ///
    /// An active particulate measurement is stopped first (only when its
    /// firmware can sleep) and restarted by [`wake_up_all`](Self::wake_up_all).
    pub fn sleep_all(&mut self) -> BatchReport {
        let mut report = BatchReport::new(BulkOperation::Sleep);
        for kind in SensorKind::ALL {
            if kind == SensorKind::Particulate {
                if let Err(e) = self.pause_particulate() {
                    report.push(kind, Outcome::Failed(e));
                    continue;
                }
            }
            if let Some(machine) = self.machine_mut(kind) {
                report.push(kind, sleep_outcome(machine));
            }
        }
        report
    }

    pub fn wake_up_all(&mut self) -> BatchReport {
        let mut report = BatchReport::new(BulkOperation::WakeUp);
        for kind in SensorKind::ALL {
            let Some(machine) = self.machine_mut(kind) else {
                continue;
            };
            let mut outcome = wake_outcome(machine);
            if kind == SensorKind::Particulate && !outcome.is_failed() {
                if let Err(e) = self.resume_particulate() {
                    outcome = Outcome::Failed(e);
                }
            }
            report.push(kind, outcome);
        }
        report
    }

    fn pause_particulate(&mut self) -> Result<(), SensorError> {
        if let Some(pm) = self.particulate.as_mut() {
            if pm.supports_sleep() && pm.state() == LifecycleState::Ready && pm.is_measuring() {
                pm.stop_measurement()?;
                self.particulate_paused = true;
            }
        }
        Ok(())
    }

    fn resume_particulate(&mut self) -> Result<(), SensorError> {
        if !self.particulate_paused {
            return Ok(());
        }
        if let Some(pm) = self.particulate.as_mut() {
            if pm.state() == LifecycleState::Ready && !pm.is_measuring() {
                pm.start_measurement()?;
            }
        }
        self.particulate_paused = false;
        Ok(())
    }

    // --- Teardown ---

    /// Shuts every sensor down, particulate first (stop measurement, close
    /// the UART). Never fails; a second call is harmless.
    pub fn shutdown(&mut self) -> BatchReport {
        let mut report = BatchReport::new(BulkOperation::Shutdown);
        for kind in SensorKind::SHUTDOWN_ORDER {
            if let Some(machine) = self.machine_mut(kind) {
                report.push(kind, machine.shutdown().into());
            }
        }
        if !self.shut_down {
            self.shut_down = true;
            self.particulate_paused = false;
            log::info!("sensor hub shut down");
        }
        report
    }
}

impl<P, D> Drop for Coordinator<P, D>
where
    P: TransportProvider,
    D: DelayNs + Clone,
{
    fn drop(&mut self) {
        if !self.shut_down {
            self.shutdown();
        }
    }
}

fn sleep_outcome(machine: &mut dyn SensorMachine) -> Outcome {
    if !machine.capabilities().sleep {
        return Outcome::Skipped(SkipReason::Unsupported);
    }
    if !machine.sleep_effective() {
        return Outcome::Skipped(SkipReason::FirmwareGated);
    }
    if machine.state() == LifecycleState::Sleeping {
        return Outcome::Skipped(SkipReason::AlreadyInState(LifecycleState::Sleeping));
    }
    machine.sleep().into()
}

fn wake_outcome(machine: &mut dyn SensorMachine) -> Outcome {
    if !machine.capabilities().wake {
        return Outcome::Skipped(SkipReason::Unsupported);
    }
    if !machine.sleep_effective() {
        return Outcome::Skipped(SkipReason::FirmwareGated);
    }
    match machine.state() {
        LifecycleState::Sleeping => machine.wake_up().into(),
        other => Outcome::Skipped(SkipReason::AlreadyInState(other)),
    }
}
