// src/common/error.rs

use super::hal_traits::Status;
use super::types::{LifecycleState, SensorKind};
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

/// A value in an error's detail map.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailValue {
    Int(i64),
    Float(f32),
    Text(String),
}

impl From<i64> for DetailValue {
    fn from(v: i64) -> Self {
        DetailValue::Int(v)
    }
}

impl From<u8> for DetailValue {
    fn from(v: u8) -> Self {
        DetailValue::Int(v.into())
    }
}

impl From<u16> for DetailValue {
    fn from(v: u16) -> Self {
        DetailValue::Int(v.into())
    }
}

impl From<f32> for DetailValue {
    fn from(v: f32) -> Self {
        DetailValue::Float(v)
    }
}

impl From<&str> for DetailValue {
    fn from(v: &str) -> Self {
        DetailValue::Text(v.into())
    }
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailValue::Int(v) => write!(f, "{}", v),
            DetailValue::Float(v) => write!(f, "{}", v),
            DetailValue::Text(v) => f.write_str(v),
        }
    }
}

/// Where an error happened: which sensor, which driver operation, the raw
/// driver status if there was one, plus free-form details (init step,
/// attempted interval, compensation values...).
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    pub sensor: SensorKind,
    pub operation: &'static str,
    pub status: Option<Status>,
    pub details: BTreeMap<&'static str, DetailValue>,
}

impl ErrorContext {
    pub fn new(sensor: SensorKind, operation: &'static str) -> Self {
        ErrorContext {
            sensor,
            operation,
            status: None,
            details: BTreeMap::new(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_detail(mut self, key: &'static str, value: impl Into<DetailValue>) -> Self {
        self.details.insert(key, value.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.sensor, self.operation)?;
        if let Some(status) = self.status {
            write!(f, " (error code: {})", status)?;
        }
        for (key, value) in &self.details {
            write!(f, ", {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Why a post-initialization operation failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReadFailure {
    /// The machine has not been initialized.
    Uninitialized,
    /// The lifecycle state does not allow this operation (sleeping, destroyed...).
    InvalidState(LifecycleState),
    /// The operation needs continuous measurement running.
    MeasurementInactive,
    /// The operation needs continuous measurement stopped first.
    MeasurementActive,
    /// The device has not buffered a measurement yet. Retry after a short delay.
    NotEnoughData,
    /// The driver reported a nonzero status.
    Device,
    /// The device answered, but the payload could not be decoded.
    InvalidData,
}

impl fmt::Display for ReadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ReadFailure::*;
        match self {
            Uninitialized => write!(f, "sensor not initialized"),
            InvalidState(state) => write!(f, "not allowed while {}", state),
            MeasurementInactive => write!(f, "measurement not started"),
            MeasurementActive => write!(f, "stop measurement first"),
            NotEnoughData => write!(f, "not enough data available yet"),
            Device => write!(f, "device error"),
            InvalidData => write!(f, "invalid data from device"),
        }
    }
}

/// Error type shared by every capability machine and the coordinator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SensorError {
    /// A setup step failed; the sensor is not operational.
    #[error("initialization failed: {0}")]
    Initialization(ErrorContext),

    /// A post-init operation failed. The sensor may still serve other calls.
    #[error("{reason}: {context}")]
    Read {
        reason: ReadFailure,
        context: ErrorContext,
    },

    /// The caller broke an argument contract (missing compensation value...).
    /// No bus command was issued.
    #[error("missing or invalid argument `{argument}`: {context}")]
    Argument {
        argument: &'static str,
        context: ErrorContext,
    },

    /// The sensor (or its firmware) has no such operation.
    #[error("operation not supported: {0}")]
    Unsupported(ErrorContext),
}

impl SensorError {
    pub(crate) fn init(sensor: SensorKind, operation: &'static str, status: Status) -> Self {
        SensorError::Initialization(ErrorContext::new(sensor, operation).with_status(status))
    }

    pub(crate) fn device(sensor: SensorKind, operation: &'static str, status: Status) -> Self {
        SensorError::Read {
            reason: ReadFailure::Device,
            context: ErrorContext::new(sensor, operation).with_status(status),
        }
    }

    pub(crate) fn state(sensor: SensorKind, operation: &'static str, reason: ReadFailure) -> Self {
        SensorError::Read {
            reason,
            context: ErrorContext::new(sensor, operation),
        }
    }

    pub(crate) fn unsupported(sensor: SensorKind, operation: &'static str) -> Self {
        SensorError::Unsupported(ErrorContext::new(sensor, operation))
    }

    /// Attach a detail to whichever context this error carries.
    pub fn with_detail(mut self, key: &'static str, value: impl Into<DetailValue>) -> Self {
        self.context_mut().details.insert(key, value.into());
        self
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            SensorError::Initialization(context)
            | SensorError::Unsupported(context)
            | SensorError::Read { context, .. }
            | SensorError::Argument { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            SensorError::Initialization(context)
            | SensorError::Unsupported(context)
            | SensorError::Read { context, .. }
            | SensorError::Argument { context, .. } => context,
        }
    }

    pub fn sensor(&self) -> SensorKind {
        self.context().sensor
    }

    pub fn operation(&self) -> &'static str {
        self.context().operation
    }

    pub fn status(&self) -> Option<Status> {
        self.context().status
    }

    pub fn detail(&self, key: &str) -> Option<&DetailValue> {
        self.context().details.get(key)
    }

    /// The [`ReadFailure`] reason, for `Read` errors.
    pub fn read_failure(&self) -> Option<ReadFailure> {
        match self {
            SensorError::Read { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// True when the same call may succeed after a short wait.
    pub fn is_retryable(&self) -> bool {
        self.read_failure() == Some(ReadFailure::NotEnoughData)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, SensorError::Unsupported(_))
    }
}
