//! Run configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detector::validate_epsilon;
use crate::error::Result;
use crate::io::report::ReportFormat;
use crate::models::ModelKind;

/// Threshold used when none is given.
pub const DEFAULT_EPSILON: f64 = 0.0005;

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_parallel() -> bool {
    true
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Everything one detection run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub training: PathBuf,
    pub test: PathBuf,
    /// Ground-truth labels; evaluation is skipped without them.
    #[serde(default)]
    pub labels: Option<PathBuf>,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default)]
    pub model: ModelKind,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub format: ReportFormat,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            training: PathBuf::new(),
            test: PathBuf::new(),
            labels: None,
            epsilon: DEFAULT_EPSILON,
            model: ModelKind::default(),
            parallel: default_parallel(),
            workers: default_workers(),
            format: ReportFormat::default(),
        }
    }
}

impl DetectionConfig {
    pub fn new(training: impl Into<PathBuf>, test: impl Into<PathBuf>) -> Self {
        Self {
            training: training.into(),
            test: test.into(),
            ..Default::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_labels(mut self, labels: impl Into<PathBuf>) -> Self {
        self.labels = Some(labels.into());
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_epsilon(self.epsilon)
    }
}
