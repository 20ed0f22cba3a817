// src/common/record/info.rs

use crate::common::hal_traits::SPS30_MAX_SERIAL_LEN;
use crate::common::types::SensorKind;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use arrayvec::ArrayString;

/// SPS30 firmware/hardware/protocol versions, read once during init.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionInfo {
    pub firmware_major: u8,
    pub firmware_minor: u8,
    pub hardware_revision: u8,
    pub shdlc_major: u8,
    pub shdlc_minor: u8,
}

impl VersionInfo {
    /// Sleep and wake-up exist from firmware 2.0 on.
    pub const SLEEP_MIN_FIRMWARE_MAJOR: u8 = 2;

    pub const fn supports_sleep(&self) -> bool {
        self.firmware_major >= Self::SLEEP_MIN_FIRMWARE_MAJOR
    }

    pub fn firmware_version(&self) -> String {
        format!("{}.{}", self.firmware_major, self.firmware_minor)
    }

    pub fn shdlc_version(&self) -> String {
        format!("{}.{}", self.shdlc_major, self.shdlc_minor)
    }
}

/// STC31-C identification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Co2Info {
    pub product_id: u32,
    /// 64-bit serial as uppercase hexadecimal, no prefix.
    pub serial_number: String,
}

/// SHTC3 identification.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempHumidityInfo {
    pub serial_number: u32,
}

/// SPS30 identification, as cached during init.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticulateInfo {
    pub version: VersionInfo,
    pub serial_number: ArrayString<SPS30_MAX_SERIAL_LEN>,
}

/// Identification record of one sensor, as returned by `get_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorInfo {
    Co2(Co2Info),
    TempHumidity(TempHumidityInfo),
    Particulate(ParticulateInfo),
}

impl SensorInfo {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorInfo::Co2(_) => SensorKind::Co2,
            SensorInfo::TempHumidity(_) => SensorKind::TempHumidity,
            SensorInfo::Particulate(_) => SensorKind::Particulate,
        }
    }

    pub fn product_name(&self) -> &'static str {
        self.kind().product_name()
    }

    pub fn serial_number(&self) -> String {
        match self {
            SensorInfo::Co2(info) => info.serial_number.clone(),
            SensorInfo::TempHumidity(info) => info.serial_number.to_string(),
            SensorInfo::Particulate(info) => info.serial_number.as_str().into(),
        }
    }

    /// Only the SPS30 reports a firmware version.
    pub fn firmware_version(&self) -> Option<String> {
        match self {
            SensorInfo::Particulate(info) => Some(info.version.firmware_version()),
            _ => None,
        }
    }
}

/// Result of `get_all_info`: one entry per sensor that answered.
pub type InfoSet = BTreeMap<SensorKind, SensorInfo>;
