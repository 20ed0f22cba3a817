// src/sensor/mod.rs

// One capability machine per sensor kind. Each owns its driver, its delay and
// its lifecycle state; every public operation starts with a guard over that
// state (plus the measurement sub-state for the SPS30).

pub mod shtc3;
pub mod sps30;
pub mod stc31c;

pub use shtc3::Shtc3Sensor;
pub use sps30::Sps30Sensor;
pub use stc31c::Stc31cSensor;

use crate::common::{
    Capabilities, ErrorContext, LifecycleState, ReadFailure, SensorError, SensorInfo, SensorKind,
};

/// Operations the coordinator drives uniformly across all sensor kinds.
///
/// `read` is deliberately absent: its inputs differ per kind (the CO₂ sensor
/// takes a compensation sample, the SHTC3 a precision).
pub trait SensorMachine {
    fn kind(&self) -> SensorKind;

    fn state(&self) -> LifecycleState;

    fn capabilities(&self) -> Capabilities {
        self.kind().capabilities()
    }

    /// Whether `sleep`/`wake_up` would change anything right now. False for
    /// kinds without sleep and for firmware that gates it off.
    fn sleep_effective(&self) -> bool {
        self.capabilities().sleep
    }

    fn get_info(&mut self) -> Result<SensorInfo, SensorError>;

    fn sleep(&mut self) -> Result<(), SensorError>;

    fn wake_up(&mut self) -> Result<(), SensorError>;

    /// Tear the sensor down and release its transport. Safe to call again.
    fn shutdown(&mut self) -> Result<(), SensorError>;
}

/// Fails unless `current` is one of `allowed`.
pub(crate) fn require_state(
    sensor: SensorKind,
    operation: &'static str,
    current: LifecycleState,
    allowed: &[LifecycleState],
) -> Result<(), SensorError> {
    if allowed.contains(&current) {
        return Ok(());
    }
    let reason = match current {
        LifecycleState::Uninitialized => ReadFailure::Uninitialized,
        other => ReadFailure::InvalidState(other),
    };
    Err(SensorError::state(sensor, operation, reason))
}

/// `initialize` is only valid from `Uninitialized`.
pub(crate) fn require_uninitialized(
    sensor: SensorKind,
    current: LifecycleState,
) -> Result<(), SensorError> {
    if current == LifecycleState::Uninitialized {
        return Ok(());
    }
    Err(SensorError::Initialization(
        ErrorContext::new(sensor, "initialize").with_detail("state", current.as_str()),
    ))
}
