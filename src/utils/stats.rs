use ndarray::{Array1, Array2, ArrayView1};
use tracing::info;

use crate::error::{AnomalyError, Result};
use crate::utils::matrix::FeatureMatrix;

/// Per-feature statistics of a training matrix.
///
/// Standard deviations and covariances use the (n - 1) denominator. The
/// covariance diagonal is built from the same sums as `stddev`, so
/// `covariance[[j, j]] == stddev[j]^2` up to rounding of the square root.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStatistics {
    mean: Array1<f64>,
    stddev: Array1<f64>,
    covariance: Array2<f64>,
    n_samples: usize,
}

impl FeatureStatistics {
    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    pub fn stddev(&self) -> ArrayView1<'_, f64> {
        self.stddev.view()
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Number of training rows the statistics were estimated from.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }
}

/// Estimate mean, sample standard deviation and sample covariance.
pub fn estimate(training: &FeatureMatrix) -> Result<FeatureStatistics> {
    require_rows(training, 2)?;

    let mean = mean(training)?;
    let covariance = covariance_around(training, &mean);
    let stddev = covariance.diag().mapv(f64::sqrt);

    info!(
        rows = training.n_rows(),
        features = training.n_features(),
        "Estimated feature statistics"
    );

    Ok(FeatureStatistics {
        mean,
        stddev,
        covariance,
        n_samples: training.n_rows(),
    })
}

/// Arithmetic mean of every column.
pub fn mean(training: &FeatureMatrix) -> Result<Array1<f64>> {
    require_rows(training, 1)?;

    let n = training.n_rows() as f64;
    let mut sums = Array1::<f64>::zeros(training.n_features());
    for row in training.rows() {
        sums += &row;
    }
    Ok(sums / n)
}

/// Sample standard deviation of every column.
pub fn sample_std(training: &FeatureMatrix) -> Result<Array1<f64>> {
    require_rows(training, 2)?;

    let mean = mean(training)?;
    let denominator = (training.n_rows() - 1) as f64;
    let mut sum_squares = Array1::<f64>::zeros(training.n_features());
    for row in training.rows() {
        for (j, &value) in row.iter().enumerate() {
            let diff = value - mean[j];
            sum_squares[j] += diff * diff;
        }
    }
    Ok(sum_squares.mapv(|s| (s / denominator).sqrt()))
}

/// Features x features sample covariance matrix.
pub fn sample_covariance(training: &FeatureMatrix) -> Result<Array2<f64>> {
    require_rows(training, 2)?;

    let mean = mean(training)?;
    Ok(covariance_around(training, &mean))
}

// Caller guarantees at least two rows.
fn covariance_around(training: &FeatureMatrix, mean: &Array1<f64>) -> Array2<f64> {
    let k = training.n_features();
    let denominator = (training.n_rows() - 1) as f64;
    let mut cov = Array2::<f64>::zeros((k, k));

    for row in training.rows() {
        let diff = &row - mean;
        for i in 0..k {
            for j in i..k {
                cov[[i, j]] += diff[i] * diff[j];
            }
        }
    }

    for i in 0..k {
        for j in i..k {
            let value = cov[[i, j]] / denominator;
            cov[[i, j]] = value;
            cov[[j, i]] = value;
        }
    }
    cov
}

fn require_rows(training: &FeatureMatrix, required: usize) -> Result<()> {
    if training.n_rows() < required {
        return Err(AnomalyError::DegenerateInput {
            rows: training.n_rows(),
            required,
        });
    }
    Ok(())
}
