// src/coordinator/report.rs

use crate::common::{
    error::SensorError,
    record::ReadingSet,
    types::{LifecycleState, SensorKind},
};
use alloc::vec::Vec;
use core::fmt;

/// Which bulk operation a [`BatchReport`] describes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BulkOperation {
    GetInfo,
    Read,
    Sleep,
    WakeUp,
    Shutdown,
}

impl BulkOperation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BulkOperation::GetInfo => "get_info",
            BulkOperation::Read => "read",
            BulkOperation::Sleep => "sleep",
            BulkOperation::WakeUp => "wake_up",
            BulkOperation::Shutdown => "shutdown",
        }
    }
}

/// Why a sensor was left out of a bulk operation without an attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SkipReason {
    /// The sensor kind has no such capability.
    Unsupported,
    /// The cached firmware version has no such capability.
    FirmwareGated,
    /// Nothing to do: the sensor is already in the target state.
    AlreadyInState(LifecycleState),
    /// CO₂ read skipped: the temperature/humidity read produced no sample.
    MissingCompensation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unsupported => f.write_str("not supported by this sensor"),
            SkipReason::FirmwareGated => f.write_str("not supported by this firmware"),
            SkipReason::AlreadyInState(state) => write!(f, "already {}", state),
            SkipReason::MissingCompensation => f.write_str("no compensation sample"),
        }
    }
}

/// Per-sensor result of one step in a bulk operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done,
    Skipped(SkipReason),
    Failed(SensorError),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn error(&self) -> Option<&SensorError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Result<(), SensorError>> for Outcome {
    fn from(result: Result<(), SensorError>) -> Self {
        match result {
            Ok(()) => Outcome::Done,
            Err(e) => Outcome::Failed(e),
        }
    }
}

/// Tagged per-sensor outcomes of a bulk operation, in processing order.
///
/// Only enabled sensors appear.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    operation: BulkOperation,
    outcomes: Vec<(SensorKind, Outcome)>,
}

impl BatchReport {
    pub fn new(operation: BulkOperation) -> Self {
        BatchReport {
            operation,
            outcomes: Vec::new(),
        }
    }

    pub fn operation(&self) -> BulkOperation {
        self.operation
    }

    /// Records an outcome and logs failures and skips.
    pub(crate) fn push(&mut self, kind: SensorKind, outcome: Outcome) {
        match &outcome {
            Outcome::Done => {}
            Outcome::Skipped(reason) => {
                log::debug!("{} {} skipped: {}", kind, self.operation.as_str(), reason)
            }
            Outcome::Failed(e) => log::warn!("{} {} failed: {}", kind, self.operation.as_str(), e),
        }
        self.outcomes.push((kind, outcome));
    }

    pub fn outcome(&self, kind: SensorKind) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (SensorKind, &SensorError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|(kind, outcome)| outcome.error().map(|e| (*kind, e)))
    }

    /// No sensor failed. Skips count as success.
    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(|(_, outcome)| outcome.is_failed())
    }

    pub fn kinds(&self) -> impl Iterator<Item = SensorKind> + '_ {
        self.outcomes.iter().map(|(kind, _)| *kind)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, (SensorKind, Outcome)> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Readings of one cycle plus what happened to each sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadCycle {
    pub readings: ReadingSet,
    pub report: BatchReport,
}
