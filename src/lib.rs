// src/lib.rs

//! Coordination layer for a three-sensor air-quality node:
//!
//! - **STC31-C** CO₂ sensor (I²C). Needs a fresh temperature/humidity sample
//!   on every read for compensation.
//! - **SHTC3** temperature/humidity sensor (I²C), driven through the SHT4x
//!   command set. Supplies the compensation sample.
//! - **SPS30** particulate-matter sensor (UART/SHDLC). Multi-phase start-up,
//!   a continuous-measurement sub-state and firmware-gated sleep.
//!
//! The byte-level drivers are external collaborators described by the traits
//! in [`common::hal_traits`]. Each sensor gets a capability machine in
//! [`sensor`] that owns its driver and lifecycle state; the [`Coordinator`]
//! owns up to three machines, initializes them in dependency order and runs
//! fault-isolated bulk operations over them.
//!
//! ```ignore
//! use envhub::{Coordinator, CoordinatorConfig};
//!
//! let config = CoordinatorConfig::default().with_co2_self_calibration(true);
//! let mut hub = Coordinator::new(config, my_transports, envhub::StdDelay)?;
//!
//! let readings = hub.read_all();
//! if let Some(co2) = readings.get(envhub::SensorKind::Co2) {
//!     log::info!("CO2: {:?} ppm", co2.get("co2_concentration"));
//! }
//! hub.shutdown();
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod common;
pub mod coordinator;
pub mod sensor;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use common::{
    Capabilities, CompensationSample, InfoSet, LifecycleState, MeasurementRecord, Precision,
    ReadFailure, ReadingSet, SensorError, SensorInfo, SensorKind,
};
pub use coordinator::{
    BatchReport, BulkOperation, Coordinator, CoordinatorConfig, Outcome, ReadCycle, SkipReason,
    TransportProvider,
};
pub use sensor::{SensorMachine, Shtc3Sensor, Sps30Sensor, Stc31cSensor};

#[cfg(feature = "std")]
pub use common::hal_traits::StdDelay;
