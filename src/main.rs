//! Command-line runner for Gaussian anomaly detection.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use gaussian_anomaly::io::loader::WhitespaceLoader;
use gaussian_anomaly::io::report::{JsonLinesReport, ReportFormat, TextReport};
use gaussian_anomaly::{run, AnomalyError, DetectionConfig, ModelKind, Result};

#[derive(Parser, Debug)]
#[command(name = "gaussian-anomaly")]
#[command(about = "Flag low-density examples under a Gaussian model of normal data")]
#[command(version)]
struct Cli {
    /// Training matrix, one whitespace-separated example per line
    #[arg(long)]
    training: Option<PathBuf>,

    /// Test matrix to score
    #[arg(long)]
    test: Option<PathBuf>,

    /// Ground-truth labels, one `true`/`false` per test row
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Density threshold; examples below it are anomalies
    #[arg(short, long)]
    epsilon: Option<f64>,

    /// univariate or multivariate
    #[arg(short, long)]
    model: Option<ModelKind>,

    /// text or json
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// JSON config file; other flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Score rows on the main thread only
    #[arg(long)]
    sequential: bool,

    /// Worker threads for parallel scoring
    #[arg(long)]
    workers: Option<usize>,
}

impl Cli {
    fn into_config(self) -> Result<DetectionConfig> {
        let mut config = match &self.config {
            Some(path) => DetectionConfig::from_json_file(path)?,
            None => DetectionConfig::default(),
        };

        if let Some(training) = self.training {
            config.training = training;
        }
        if let Some(test) = self.test {
            config.test = test;
        }
        if self.labels.is_some() {
            config.labels = self.labels;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.sequential {
            config.parallel = false;
        }

        for (name, path) in [("training", &config.training), ("test", &config.test)] {
            if path.as_os_str().is_empty() {
                return Err(AnomalyError::InvalidParameter {
                    name: name.to_string(),
                    value: String::new(),
                    reason: "a path is required (flag or config file)".to_string(),
                });
            }
        }
        Ok(config)
    }
}

fn execute(config: &DetectionConfig) -> Result<()> {
    let stdout = io::stdout().lock();
    match config.format {
        ReportFormat::Text => run(config, &WhitespaceLoader, &mut TextReport::new(stdout))?,
        ReportFormat::Json => run(config, &WhitespaceLoader, &mut JsonLinesReport::new(stdout))?,
    };
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gaussian_anomaly=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let result = Cli::parse().into_config().and_then(|config| execute(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(detail = %e, "Detection failed");
            ExitCode::FAILURE
        }
    }
}
