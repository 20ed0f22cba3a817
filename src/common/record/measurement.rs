// src/common/record/measurement.rs

use crate::common::types::SensorKind;
use alloc::collections::btree_map::{self, BTreeMap};

/// Multiplier from volume percent to parts per million.
pub const PPM_PER_VOL_PERCENT: f32 = 10_000.0;

/// CO₂ reading from the STC31-C.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Co2Measurement {
    /// CO₂ concentration in ppm.
    pub co2_concentration: f32,
    /// The sensor's own temperature in °C.
    pub temperature: f32,
}

impl Co2Measurement {
    pub const FIELDS: &'static [&'static str] = &["co2_concentration", "temperature"];

    /// Builds a measurement from the raw `(vol%, °C)` pair the driver returns.
    pub fn from_vol_percent(co2_vol_percent: f32, temperature: f32) -> Self {
        Co2Measurement {
            co2_concentration: co2_vol_percent * PPM_PER_VOL_PERCENT,
            temperature,
        }
    }
}

/// Temperature/humidity reading from the SHTC3.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempHumidityMeasurement {
    /// °C
    pub temperature: f32,
    /// %RH
    pub relative_humidity: f32,
}

impl TempHumidityMeasurement {
    pub const FIELDS: &'static [&'static str] = &["temperature", "relative_humidity"];

    /// The compensation sample for a CO₂ read in the same cycle.
    pub fn compensation(&self) -> CompensationSample {
        CompensationSample::new(self.temperature, self.relative_humidity)
    }
}

/// Particulate-matter reading from the SPS30.
///
/// Mass concentrations in µg/m³, number concentrations in #/cm³, typical
/// particle size in µm.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticulateMeasurement {
    pub mc_1p0: f32,
    pub mc_2p5: f32,
    pub mc_4p0: f32,
    pub mc_10p0: f32,
    pub nc_0p5: f32,
    pub nc_1p0: f32,
    pub nc_2p5: f32,
    pub nc_4p0: f32,
    pub nc_10p0: f32,
    pub typical_particle_size: f32,
}

impl ParticulateMeasurement {
    pub const FIELDS: &'static [&'static str] = &[
        "pm1.0",
        "pm2.5",
        "pm4.0",
        "pm10.0",
        "nc0.5",
        "nc1.0",
        "nc2.5",
        "nc4.0",
        "nc10.0",
        "typical_particle_size",
    ];

    fn get(&self, field: &str) -> Option<f32> {
        let value = match field {
            "pm1.0" => self.mc_1p0,
            "pm2.5" => self.mc_2p5,
            "pm4.0" => self.mc_4p0,
            "pm10.0" => self.mc_10p0,
            "nc0.5" => self.nc_0p5,
            "nc1.0" => self.nc_1p0,
            "nc2.5" => self.nc_2p5,
            "nc4.0" => self.nc_4p0,
            "nc10.0" => self.nc_10p0,
            "typical_particle_size" => self.typical_particle_size,
            _ => return None,
        };
        Some(value)
    }
}

/// Temperature and relative humidity handed to one CO₂ read.
///
/// Not `Clone`: a sample is moved into the read that consumes it.
#[derive(Debug, PartialEq)]
pub struct CompensationSample {
    temperature: f32,
    relative_humidity: f32,
}

impl CompensationSample {
    pub fn new(temperature: f32, relative_humidity: f32) -> Self {
        CompensationSample {
            temperature,
            relative_humidity,
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn relative_humidity(&self) -> f32 {
        self.relative_humidity
    }
}

/// One successful read, with a fixed field set per sensor kind.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasurementRecord {
    Co2(Co2Measurement),
    TempHumidity(TempHumidityMeasurement),
    Particulate(ParticulateMeasurement),
}

impl MeasurementRecord {
    pub fn kind(&self) -> SensorKind {
        match self {
            MeasurementRecord::Co2(_) => SensorKind::Co2,
            MeasurementRecord::TempHumidity(_) => SensorKind::TempHumidity,
            MeasurementRecord::Particulate(_) => SensorKind::Particulate,
        }
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            MeasurementRecord::Co2(_) => Co2Measurement::FIELDS,
            MeasurementRecord::TempHumidity(_) => TempHumidityMeasurement::FIELDS,
            MeasurementRecord::Particulate(_) => ParticulateMeasurement::FIELDS,
        }
    }

    /// Looks up a field by name, e.g. `"co2_concentration"` or `"pm2.5"`.
    pub fn get(&self, field: &str) -> Option<f32> {
        match (self, field) {
            (MeasurementRecord::Co2(m), "co2_concentration") => Some(m.co2_concentration),
            (MeasurementRecord::Co2(m), "temperature") => Some(m.temperature),
            (MeasurementRecord::TempHumidity(m), "temperature") => Some(m.temperature),
            (MeasurementRecord::TempHumidity(m), "relative_humidity") => {
                Some(m.relative_humidity)
            }
            (MeasurementRecord::Particulate(m), name) => m.get(name),
            _ => None,
        }
    }

    /// `(name, value)` pairs in the kind's fixed field order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.field_names()
            .iter()
            .filter_map(move |name| self.get(name).map(|value| (*name, value)))
    }
}

impl From<Co2Measurement> for MeasurementRecord {
    fn from(m: Co2Measurement) -> Self {
        MeasurementRecord::Co2(m)
    }
}

impl From<TempHumidityMeasurement> for MeasurementRecord {
    fn from(m: TempHumidityMeasurement) -> Self {
        MeasurementRecord::TempHumidity(m)
    }
}

impl From<ParticulateMeasurement> for MeasurementRecord {
    fn from(m: ParticulateMeasurement) -> Self {
        MeasurementRecord::Particulate(m)
    }
}

/// Result of one read cycle. A kind is missing when the sensor is disabled,
/// its read failed, or (for CO₂) no compensation sample was available.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadingSet(BTreeMap<SensorKind, MeasurementRecord>);

impl ReadingSet {
    pub fn new() -> Self {
        ReadingSet(BTreeMap::new())
    }

    pub(crate) fn insert(&mut self, record: MeasurementRecord) {
        self.0.insert(record.kind(), record);
    }

    pub fn get(&self, kind: SensorKind) -> Option<&MeasurementRecord> {
        self.0.get(&kind)
    }

    pub fn contains(&self, kind: SensorKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn co2(&self) -> Option<&Co2Measurement> {
        match self.get(SensorKind::Co2) {
            Some(MeasurementRecord::Co2(m)) => Some(m),
            _ => None,
        }
    }

    pub fn temp_humidity(&self) -> Option<&TempHumidityMeasurement> {
        match self.get(SensorKind::TempHumidity) {
            Some(MeasurementRecord::TempHumidity(m)) => Some(m),
            _ => None,
        }
    }

    pub fn particulate(&self) -> Option<&ParticulateMeasurement> {
        match self.get(SensorKind::Particulate) {
            Some(MeasurementRecord::Particulate(m)) => Some(m),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = SensorKind> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, SensorKind, MeasurementRecord> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ReadingSet {
    type Item = (&'a SensorKind, &'a MeasurementRecord);
    type IntoIter = btree_map::Iter<'a, SensorKind, MeasurementRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
