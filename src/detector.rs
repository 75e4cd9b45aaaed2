//! Threshold classification of scored examples.

use ndarray::ArrayView1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AnomalyError, Result};
use crate::models::base_model::DensityModel;
use crate::models::{GaussianModel, ModelKind};
use crate::utils::matrix::FeatureMatrix;
use crate::utils::stats::FeatureStatistics;

/// One test row after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredExample {
    /// Zero-based row index in the test matrix.
    pub index: usize,
    pub probability: f64,
    pub is_anomaly: bool,
}

/// `true` iff `probability < epsilon`. A density equal to epsilon is normal.
pub fn classify(probability: f64, epsilon: f64) -> bool {
    probability < epsilon
}

/// Reject thresholds that are not finite and strictly positive.
pub fn validate_epsilon(epsilon: f64) -> Result<()> {
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(AnomalyError::InvalidParameter {
            name: "epsilon".to_string(),
            value: epsilon.to_string(),
            reason: "must be a positive finite number".to_string(),
        });
    }
    Ok(())
}

/// Score and classify every row of `test` with the model `kind`, in row order.
pub fn classify_all(
    test: &FeatureMatrix,
    stats: &FeatureStatistics,
    epsilon: f64,
    kind: ModelKind,
) -> Result<Vec<ScoredExample>> {
    let model = GaussianModel::fit(kind, stats)?;
    classify_with_model(&model, test, epsilon)
}

/// Like `classify_all`, spreading rows over a pool of `workers` threads.
/// Output order still follows the input rows.
pub fn classify_all_parallel(
    test: &FeatureMatrix,
    stats: &FeatureStatistics,
    epsilon: f64,
    kind: ModelKind,
    workers: usize,
) -> Result<Vec<ScoredExample>> {
    let model = GaussianModel::fit(kind, stats)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| AnomalyError::ThreadPool(e.to_string()))?;
    pool.install(|| classify_with_model_parallel(&model, test, epsilon))
}

/// Classify with an already fitted model on the current thread.
pub fn classify_with_model<M: DensityModel>(
    model: &M,
    test: &FeatureMatrix,
    epsilon: f64,
) -> Result<Vec<ScoredExample>> {
    validate_epsilon(epsilon)?;
    let scored = test
        .rows()
        .enumerate()
        .map(|(index, row)| score_row(model, index, row, epsilon))
        .collect::<Result<Vec<_>>>()?;
    log_summary(&scored, epsilon);
    Ok(scored)
}

/// Classify with an already fitted model on the current rayon pool.
pub fn classify_with_model_parallel<M: DensityModel + Sync>(
    model: &M,
    test: &FeatureMatrix,
    epsilon: f64,
) -> Result<Vec<ScoredExample>> {
    validate_epsilon(epsilon)?;
    let scored = (0..test.n_rows())
        .into_par_iter()
        .map(|index| score_row(model, index, test.row(index), epsilon))
        .collect::<Result<Vec<_>>>()?;
    log_summary(&scored, epsilon);
    Ok(scored)
}

fn score_row<M: DensityModel>(
    model: &M,
    index: usize,
    row: ArrayView1<'_, f64>,
    epsilon: f64,
) -> Result<ScoredExample> {
    let probability = model.density(row)?;
    let is_anomaly = classify(probability, epsilon);
    if is_anomaly {
        debug!(index, probability, "Anomaly detected");
    }
    Ok(ScoredExample {
        index,
        probability,
        is_anomaly,
    })
}

fn log_summary(scored: &[ScoredExample], epsilon: f64) {
    let anomalies = scored.iter().filter(|s| s.is_anomaly).count();
    info!(rows = scored.len(), anomalies, epsilon, "Classified test examples");
}

/// Anomaly flags of `scored`, in order.
pub fn flags(scored: &[ScoredExample]) -> Vec<bool> {
    scored.iter().map(|s| s.is_anomaly).collect()
}
