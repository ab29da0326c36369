//! Shared error type across reqmeter crates.

use thiserror::Error;

/// Coarse error classes (stable API).
///
/// Callers use this to decide propagation: configuration errors abort
/// startup, observation and rendering errors are logged and swallowed on
/// the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad metric definition or bad config. Fatal at startup.
    Configuration,
    /// A rejected update to a primitive (instrumentation bug).
    Observation,
    /// A series that could not be collected or serialized.
    Rendering,
}

impl ErrorKind {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "CONFIGURATION",
            ErrorKind::Observation => "OBSERVATION",
            ErrorKind::Rendering => "RENDERING",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("duplicate metric name: {0}")]
    DuplicateMetricName(String),
    #[error("invalid metric name: {0:?}")]
    InvalidMetricName(String),
    #[error("invalid label name {label:?} on metric {metric}")]
    InvalidLabelName { metric: String, label: String },
    #[error("invalid buckets: {0}")]
    InvalidBuckets(String),
    #[error("label mismatch on {metric}: expected {expected:?}, got {got:?}")]
    LabelMismatch {
        metric: String,
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("negative value {value} passed to {metric}")]
    NegativeValue { metric: String, value: f64 },
    #[error("non-finite value passed to {0}")]
    NonFiniteValue(String),
    #[error("gauge {0} would drop below zero")]
    GaugeUnderflow(String),
    #[error("collect failed: {0}")]
    Collect(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("config: {0}")]
    Config(String),
}

impl MeterError {
    /// Map an error to its class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeterError::DuplicateMetricName(_)
            | MeterError::InvalidMetricName(_)
            | MeterError::InvalidLabelName { .. }
            | MeterError::InvalidBuckets(_)
            | MeterError::Config(_) => ErrorKind::Configuration,
            MeterError::LabelMismatch { .. }
            | MeterError::NegativeValue { .. }
            | MeterError::NonFiniteValue(_)
            | MeterError::GaugeUnderflow(_) => ErrorKind::Observation,
            MeterError::Collect(_) | MeterError::Encode(_) => ErrorKind::Rendering,
        }
    }
}
