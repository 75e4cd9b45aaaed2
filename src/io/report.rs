use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::detector::ScoredExample;
use crate::error::{AnomalyError, Result};
use crate::models::ModelKind;
use crate::utils::evaluation::EvaluationSummary;

/// Consumer of per-example results and the final evaluation.
pub trait ReportSink {
    fn begin(&mut self, _epsilon: f64, _model: ModelKind) -> Result<()> {
        Ok(())
    }

    fn example(&mut self, scored: &ScoredExample) -> Result<()>;

    fn summary(&mut self, summary: &EvaluationSummary) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Output format of the command-line report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(AnomalyError::InvalidParameter {
                name: "format".to_string(),
                value: other.to_string(),
                reason: "expected 'text' or 'json'".to_string(),
            }),
        }
    }
}

/// Human readable lines, one per example.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        TextReport { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn begin(&mut self, epsilon: f64, _model: ModelKind) -> Result<()> {
        writeln!(self.out, "The given threshold is: {epsilon}")?;
        Ok(())
    }

    fn example(&mut self, scored: &ScoredExample) -> Result<()> {
        writeln!(
            self.out,
            "Example {} is an anomaly: {}. Probability: {:e}",
            scored.index + 1,
            scored.is_anomaly,
            scored.probability
        )?;
        Ok(())
    }

    fn summary(&mut self, summary: &EvaluationSummary) -> Result<()> {
        writeln!(self.out, "The number of true positives was: {}", summary.true_positives)?;
        writeln!(self.out, "The precision was: {}", summary.precision)?;
        writeln!(self.out, "The recall was: {}", summary.recall)?;
        writeln!(self.out, "The F1 score was: {}", summary.f1_score)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record<'a> {
    Threshold { epsilon: f64, model: ModelKind },
    Example(&'a ScoredExample),
    Summary(&'a EvaluationSummary),
}

/// One JSON object per line, tagged by a `record` field.
pub struct JsonLinesReport<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesReport<W> {
    pub fn new(out: W) -> Self {
        JsonLinesReport { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &Record<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> ReportSink for JsonLinesReport<W> {
    fn begin(&mut self, epsilon: f64, model: ModelKind) -> Result<()> {
        self.write_record(&Record::Threshold { epsilon, model })
    }

    fn example(&mut self, scored: &ScoredExample) -> Result<()> {
        self.write_record(&Record::Example(scored))
    }

    fn summary(&mut self, summary: &EvaluationSummary) -> Result<()> {
        self.write_record(&Record::Summary(summary))
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps everything it receives.
#[derive(Debug, Default)]
pub struct MemoryReport {
    pub epsilon: Option<f64>,
    pub examples: Vec<ScoredExample>,
    pub summary: Option<EvaluationSummary>,
}

impl ReportSink for MemoryReport {
    fn begin(&mut self, epsilon: f64, _model: ModelKind) -> Result<()> {
        self.epsilon = Some(epsilon);
        Ok(())
    }

    fn example(&mut self, scored: &ScoredExample) -> Result<()> {
        self.examples.push(*scored);
        Ok(())
    }

    fn summary(&mut self, summary: &EvaluationSummary) -> Result<()> {
        self.summary = Some(*summary);
        Ok(())
    }
}
