pub mod base_model;
pub mod multivariate;
pub mod univariate;

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, Result};
use crate::utils::stats::FeatureStatistics;
use base_model::DensityModel;
use multivariate::MultivariateGaussian;
use univariate::UnivariateGaussian;

/// Which density family scores a classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Independent per-feature Gaussians (mean, stddev).
    #[default]
    Univariate,
    /// One joint Gaussian (mean, covariance).
    Multivariate,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Univariate => write!(f, "univariate"),
            ModelKind::Multivariate => write!(f, "multivariate"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "univariate" => Ok(ModelKind::Univariate),
            "multivariate" => Ok(ModelKind::Multivariate),
            other => Err(AnomalyError::InvalidParameter {
                name: "model".to_string(),
                value: other.to_string(),
                reason: "expected 'univariate' or 'multivariate'".to_string(),
            }),
        }
    }
}

/// A fitted model of either kind.
#[derive(Debug, Clone)]
pub enum GaussianModel {
    Univariate(UnivariateGaussian),
    Multivariate(MultivariateGaussian),
}

impl GaussianModel {
    /// Build the model `kind` from training statistics, validating the
    /// statistics it needs (positive stddev, or invertible covariance).
    pub fn fit(kind: ModelKind, stats: &FeatureStatistics) -> Result<Self> {
        match kind {
            ModelKind::Univariate => UnivariateGaussian::fit(stats).map(GaussianModel::Univariate),
            ModelKind::Multivariate => {
                MultivariateGaussian::fit(stats).map(GaussianModel::Multivariate)
            }
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            GaussianModel::Univariate(_) => ModelKind::Univariate,
            GaussianModel::Multivariate(_) => ModelKind::Multivariate,
        }
    }
}

impl DensityModel for GaussianModel {
    fn n_features(&self) -> usize {
        match self {
            GaussianModel::Univariate(m) => m.n_features(),
            GaussianModel::Multivariate(m) => m.n_features(),
        }
    }

    fn density(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        match self {
            GaussianModel::Univariate(m) => m.density(x),
            GaussianModel::Multivariate(m) => m.density(x),
        }
    }
}
