//! Gaussian anomaly detection.
//!
//! Statistics are estimated from a training matrix of "normal" examples;
//! every test example is then scored by its density under either
//! independent per-feature Gaussians or one joint multivariate Gaussian,
//! and flagged as anomalous when that density falls below a threshold.
//! Predicted flags can be evaluated against ground truth with precision,
//! recall and F1.
//!
//! - [`utils::stats`] - mean, sample stddev and sample covariance
//! - [`models`] - univariate and multivariate density models
//! - [`detector`] - threshold classification
//! - [`utils::evaluation`] - precision / recall / F1
//! - [`pipeline`] - a whole batch run from files to a report

pub mod config;
pub mod detector;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod utils;

#[cfg(feature = "python")]
mod python;

pub use config::DetectionConfig;
pub use detector::{classify, classify_all, ScoredExample};
pub use error::{AnomalyError, Result};
pub use models::{GaussianModel, ModelKind};
pub use pipeline::{detect, run, DetectionRun, Execution};
pub use utils::evaluation::{evaluate, EvaluationSummary};
pub use utils::matrix::FeatureMatrix;
pub use utils::stats::{estimate, FeatureStatistics};

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn gaussian_anomaly(_py: pyo3::Python, m: &pyo3::types::PyModule) -> pyo3::PyResult<()> {
    python::register(m)
}
