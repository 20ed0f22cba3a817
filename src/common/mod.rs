// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod address;
pub mod error;
pub mod hal_traits;
pub mod record;
pub mod timing;
pub mod types;

// --- Re-export key types/traits for easier access ---

// From address.rs
pub use address::I2cAddr;

// From error.rs
pub use error::{DetailValue, ErrorContext, ReadFailure, SensorError};

// From hal_traits.rs
pub use hal_traits::{
    DriverResult, Sht4xDriver, Sps30Driver, Status, Stc3xDriver, SPS30_ERR_NOT_ENOUGH_DATA,
    SPS30_MAX_SERIAL_LEN,
};

// From record/ (and its sub-modules via its own `pub use`)
pub use record::{
    Co2Info, Co2Measurement, CompensationSample, InfoSet, MeasurementRecord, ParticulateInfo,
    ParticulateMeasurement, ReadingSet, SensorInfo, TempHumidityInfo, TempHumidityMeasurement,
    VersionInfo,
};

// From types.rs
pub use types::{Capabilities, LifecycleState, MeasurementState, Precision, SensorKind};

// timing.rs constants are reached via common::timing::*
