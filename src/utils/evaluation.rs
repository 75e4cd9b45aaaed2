use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::detector::{flags, ScoredExample};
use crate::error::{AnomalyError, Result};

/// Confusion counts and derived metrics for one evaluation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl EvaluationSummary {
    /// Number of examples that were evaluated.
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }
}

/// Compare predicted anomaly flags against ground truth.
///
/// Precision is `tp / predicted positives`, recall is `tp / actual positives`.
/// A ratio with a zero denominator is reported as 0.0, and so is F1 when
/// precision and recall are both zero.
pub fn evaluate(predicted: &[bool], actual: &[bool]) -> Result<EvaluationSummary> {
    if predicted.len() != actual.len() {
        return Err(AnomalyError::LengthMismatch {
            predicted: predicted.len(),
            actual: actual.len(),
        });
    }

    let mut tp = 0;
    let mut fp = 0;
    let mut fn_count = 0;
    let mut tn = 0;

    for (&p, &a) in predicted.iter().zip(actual.iter()) {
        match (p, a) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fn_count += 1,
            (false, false) => tn += 1,
        }
    }

    let precision = ratio(tp, tp + fp, "precision");
    let recall = ratio(tp, tp + fn_count, "recall");
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        warn!("Precision and recall are both zero, reporting F1 as 0.0");
        0.0
    };

    Ok(EvaluationSummary {
        true_positives: tp,
        false_positives: fp,
        false_negatives: fn_count,
        true_negatives: tn,
        precision,
        recall,
        f1_score,
    })
}

/// Evaluate the flags of scored examples against labels.
pub fn evaluate_scored(scored: &[ScoredExample], actual: &[bool]) -> Result<EvaluationSummary> {
    evaluate(&flags(scored), actual)
}

fn ratio(numerator: usize, denominator: usize, metric: &str) -> f64 {
    if denominator == 0 {
        warn!(metric, "Zero denominator, reporting 0.0");
        return 0.0;
    }
    numerator as f64 / denominator as f64
}
