//! Error types for Gaussian anomaly detection

use thiserror::Error;

/// Result type alias for detection operations
pub type Result<T> = std::result::Result<T, AnomalyError>;

/// Every failure a detection run can surface.
///
/// Errors are raised by the stage that first observes the bad condition and
/// are never recovered from inside the crate.
#[derive(Error, Debug)]
pub enum AnomalyError {
    #[error("Malformed matrix: row {row} has {found} features, expected {expected}")]
    MalformedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Matrix must have at least one row and one column")]
    EmptyMatrix,

    #[error("Degenerate input: {rows} training rows, at least {required} required")]
    DegenerateInput { rows: usize, required: usize },

    #[error("Zero variance in feature {feature}")]
    ZeroVariance { feature: usize },

    #[error("Covariance matrix is singular (pivot {pivot})")]
    SingularCovariance { pivot: usize },

    #[error("Length mismatch: {predicted} predictions, {actual} labels")]
    LengthMismatch { predicted: usize, actual: usize },

    #[error("Dimension mismatch: expected {expected} features, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Parse error on line {line}: cannot read '{token}' as a number")]
    Parse { line: usize, token: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AnomalyError {
    fn from(err: serde_json::Error) -> Self {
        AnomalyError::Serialization(err.to_string())
    }
}
