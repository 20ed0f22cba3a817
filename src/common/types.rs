// src/common/types.rs

use core::fmt;

// --- Sensor identity ---

/// The three sensor kinds a [`Coordinator`](crate::Coordinator) can own.
///
/// The declaration order is the order used for info and read cycles, so
/// `BTreeMap`s keyed by `SensorKind` iterate CO₂, temperature/humidity,
/// particulate.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorKind {
    /// STC31-C thermal-conductivity CO₂ sensor on I²C.
    Co2,
    /// SHTC3 temperature/relative-humidity sensor on I²C.
    TempHumidity,
    /// SPS30 particulate-matter sensor on UART.
    Particulate,
}

impl SensorKind {
    /// All kinds, in info/read order.
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Co2,
        SensorKind::TempHumidity,
        SensorKind::Particulate,
    ];

    /// Teardown order: the particulate sensor holds the UART and an active
    /// measurement, so it goes first.
    pub const SHUTDOWN_ORDER: [SensorKind; 3] = [
        SensorKind::Particulate,
        SensorKind::Co2,
        SensorKind::TempHumidity,
    ];

    /// Short lowercase key, stable for use in logs and serialized maps.
    pub const fn key(&self) -> &'static str {
        match self {
            SensorKind::Co2 => "stc31c",
            SensorKind::TempHumidity => "shtc3",
            SensorKind::Particulate => "sps30",
        }
    }

    /// Vendor product name.
    pub const fn product_name(&self) -> &'static str {
        match self {
            SensorKind::Co2 => "STC31-C",
            SensorKind::TempHumidity => "SHTC3",
            SensorKind::Particulate => "SPS30",
        }
    }

    /// Static capability set of this kind.
    pub const fn capabilities(&self) -> Capabilities {
        match self {
            SensorKind::Co2 => Capabilities::CO2,
            SensorKind::TempHumidity => Capabilities::TEMP_HUMIDITY,
            SensorKind::Particulate => Capabilities::PARTICULATE,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.product_name())
    }
}

// --- Lifecycle ---

/// Lifecycle state of a single capability machine.
///
/// `Uninitialized → Initializing → Ready ⇄ Sleeping`, and `Ready`/`Sleeping`
/// → `Destroyed` on shutdown. A failed `initialize` falls back to
/// `Uninitialized`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Sleeping,
    Destroyed,
}

impl LifecycleState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Ready => "ready",
            LifecycleState::Sleeping => "sleeping",
            LifecycleState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Continuous-measurement sub-state of the particulate sensor. Orthogonal to
/// [`LifecycleState`]; only meaningful while `Ready`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasurementState {
    #[default]
    Idle,
    Active,
}

impl MeasurementState {
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, MeasurementState::Active)
    }
}

// --- Capabilities ---

/// What a sensor kind supports beyond `initialize`/`read`/`get_info`.
///
/// The coordinator consults this before attempting an operation. Calling an
/// unsupported operation directly on a machine still yields
/// [`SensorError::Unsupported`](crate::SensorError::Unsupported).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Capabilities {
    pub sleep: bool,
    pub wake: bool,
    pub multi_phase_init: bool,
    pub measurement_substate: bool,
    /// Sleep/wake additionally depend on the firmware version read at init.
    pub firmware_gated_sleep: bool,
}

impl Capabilities {
    pub const CO2: Capabilities = Capabilities {
        sleep: true,
        wake: true,
        multi_phase_init: true,
        measurement_substate: false,
        firmware_gated_sleep: false,
    };

    pub const TEMP_HUMIDITY: Capabilities = Capabilities {
        sleep: false,
        wake: false,
        multi_phase_init: false,
        measurement_substate: false,
        firmware_gated_sleep: false,
    };

    pub const PARTICULATE: Capabilities = Capabilities {
        sleep: true,
        wake: true,
        multi_phase_init: true,
        measurement_substate: true,
        firmware_gated_sleep: true,
    };
}

// --- Measurement options ---

/// Repeatability setting for a temperature/humidity measurement.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    #[default]
    High,
    Medium,
    Low,
}

impl Precision {
    /// Name of the driver command used for this precision.
    pub const fn command(&self) -> &'static str {
        match self {
            Precision::High => "sht4x_measure_high_precision",
            Precision::Medium => "sht4x_measure_medium_precision",
            Precision::Low => "sht4x_measure_lowest_precision",
        }
    }
}
