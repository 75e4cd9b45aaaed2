//! End-to-end batch run: estimate, score, classify, evaluate, report.

use tracing::info;

use crate::config::DetectionConfig;
use crate::detector::{classify_all, classify_all_parallel, ScoredExample};
use crate::error::Result;
use crate::io::loader::DatasetLoader;
use crate::io::report::ReportSink;
use crate::models::ModelKind;
use crate::utils::evaluation::{evaluate_scored, EvaluationSummary};
use crate::utils::matrix::FeatureMatrix;
use crate::utils::stats::{estimate, FeatureStatistics};

/// Result of one detection run.
#[derive(Debug, Clone)]
pub struct DetectionRun {
    pub statistics: FeatureStatistics,
    pub scored: Vec<ScoredExample>,
    pub summary: Option<EvaluationSummary>,
}

/// How rows are spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    Sequential,
    Parallel { workers: usize },
}

/// Pure detection over in-memory inputs.
///
/// Either every test row is scored (and evaluated, when labels are given)
/// or an error is returned.
pub fn detect(
    training: &FeatureMatrix,
    test: &FeatureMatrix,
    labels: Option<&[bool]>,
    epsilon: f64,
    kind: ModelKind,
    execution: Execution,
) -> Result<DetectionRun> {
    let statistics = estimate(training)?;
    let scored = match execution {
        Execution::Sequential => classify_all(test, &statistics, epsilon, kind)?,
        Execution::Parallel { workers } => {
            classify_all_parallel(test, &statistics, epsilon, kind, workers)?
        }
    };
    let summary = labels.map(|l| evaluate_scored(&scored, l)).transpose()?;

    Ok(DetectionRun {
        statistics,
        scored,
        summary,
    })
}

/// Load inputs through `loader`, detect, then hand results to `sink`.
///
/// Nothing reaches the sink unless the whole run succeeded.
pub fn run<L, S>(config: &DetectionConfig, loader: &L, sink: &mut S) -> Result<DetectionRun>
where
    L: DatasetLoader,
    S: ReportSink,
{
    config.validate()?;

    let training = loader.load_matrix(&config.training)?;
    let test = loader.load_matrix(&config.test)?;
    let labels = config
        .labels
        .as_deref()
        .map(|path| loader.load_labels(path))
        .transpose()?;

    info!(
        model = %config.model,
        epsilon = config.epsilon,
        training_rows = training.n_rows(),
        test_rows = test.n_rows(),
        "Starting detection run"
    );

    let execution = if config.parallel {
        Execution::Parallel {
            workers: config.workers,
        }
    } else {
        Execution::Sequential
    };
    let result = detect(
        &training,
        &test,
        labels.as_deref(),
        config.epsilon,
        config.model,
        execution,
    )?;

    sink.begin(config.epsilon, config.model)?;
    for scored in &result.scored {
        sink.example(scored)?;
    }
    if let Some(summary) = &result.summary {
        sink.summary(summary)?;
    }
    sink.finish()?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnomalyError;
    use crate::io::report::MemoryReport;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    /// In-memory loader keyed by path.
    #[derive(Default)]
    struct FixtureLoader {
        matrices: HashMap<PathBuf, Vec<Vec<f64>>>,
        labels: HashMap<PathBuf, Vec<bool>>,
    }

    impl DatasetLoader for FixtureLoader {
        fn load_matrix(&self, path: &Path) -> Result<FeatureMatrix> {
            let rows = self.matrices.get(path).cloned().unwrap_or_default();
            FeatureMatrix::from_rows(rows)
        }

        fn load_labels(&self, path: &Path) -> Result<Vec<bool>> {
            Ok(self.labels.get(path).cloned().unwrap_or_default())
        }
    }

    fn fixture(labels: Vec<bool>) -> FixtureLoader {
        let mut loader = FixtureLoader::default();
        loader.matrices.insert(
            PathBuf::from("train"),
            vec![vec![1.0, 2.0], vec![2.0, 1.5], vec![3.0, 4.0], vec![2.5, 2.0], vec![1.5, 3.0]],
        );
        loader.matrices.insert(
            PathBuf::from("test"),
            vec![vec![2.0, 2.5], vec![40.0, -30.0], vec![2.2, 2.4]],
        );
        loader.labels.insert(PathBuf::from("labels"), labels);
        loader
    }

    #[test]
    fn test_run_reports_every_example() {
        let loader = fixture(vec![false, true, false]);
        let config = DetectionConfig::new("train", "test").with_labels("labels");

        for model in [ModelKind::Univariate, ModelKind::Multivariate] {
            let mut sink = MemoryReport::default();
            let config = config.clone().with_model(model);
            let result = run(&config, &loader, &mut sink).unwrap();

            assert_eq!(sink.examples, result.scored);
            assert_eq!(
                result.scored.iter().map(|s| s.is_anomaly).collect::<Vec<_>>(),
                vec![false, true, false]
            );
            let summary = sink.summary.unwrap();
            assert_eq!(summary.true_positives, 1);
            assert_eq!(summary.f1_score, 1.0);
        }
    }

    #[test]
    fn test_label_mismatch_reports_nothing() {
        let loader = fixture(vec![false, true]);
        let config = DetectionConfig::new("train", "test").with_labels("labels");
        let mut sink = MemoryReport::default();

        let err = run(&config, &loader, &mut sink).unwrap_err();
        assert!(matches!(err, AnomalyError::LengthMismatch { predicted: 3, actual: 2 }));
        assert!(sink.epsilon.is_none());
        assert!(sink.examples.is_empty());
    }

    #[test]
    fn test_run_without_labels_skips_evaluation() {
        let loader = fixture(vec![]);
        let config = DetectionConfig::new("train", "test").with_parallel(false);
        let mut sink = MemoryReport::default();

        let result = run(&config, &loader, &mut sink).unwrap();
        assert!(result.summary.is_none());
        assert!(sink.summary.is_none());
        assert_eq!(sink.examples.len(), 3);
    }

    #[test]
    fn test_detect_execution_modes_agree() {
        let training =
            FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 7.0]])
                .unwrap();
        let test = FeatureMatrix::from_rows(vec![vec![100.0, 100.0], vec![3.0, 4.5]]).unwrap();

        let seq = detect(
            &training,
            &test,
            None,
            0.0005,
            ModelKind::Univariate,
            Execution::Sequential,
        )
        .unwrap();
        let par = detect(
            &training,
            &test,
            None,
            0.0005,
            ModelKind::Univariate,
            Execution::Parallel { workers: 2 },
        )
        .unwrap();
        assert_eq!(seq.scored, par.scored);
        assert!(seq.scored[0].is_anomaly);
        assert_eq!(seq.statistics.n_samples(), 3);
    }
}
