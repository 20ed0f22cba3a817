// src/common/record/mod.rs

pub mod info;
pub mod measurement;

pub use info::{
    Co2Info, InfoSet, ParticulateInfo, SensorInfo, TempHumidityInfo, VersionInfo,
};
pub use measurement::{
    Co2Measurement, CompensationSample, MeasurementRecord, ParticulateMeasurement, ReadingSet,
    TempHumidityMeasurement, PPM_PER_VOL_PERCENT,
};
