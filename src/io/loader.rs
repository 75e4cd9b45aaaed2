use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{AnomalyError, Result};
use crate::utils::matrix::FeatureMatrix;

/// Source of feature matrices and ground-truth labels.
pub trait DatasetLoader {
    fn load_matrix(&self, path: &Path) -> Result<FeatureMatrix>;

    fn load_labels(&self, path: &Path) -> Result<Vec<bool>>;
}

/// Plain-text loader: one example per line, values split on whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceLoader;

impl DatasetLoader for WhitespaceLoader {
    fn load_matrix(&self, path: &Path) -> Result<FeatureMatrix> {
        let matrix = parse_matrix(BufReader::new(File::open(path)?))?;
        debug!(
            path = %path.display(),
            rows = matrix.n_rows(),
            features = matrix.n_features(),
            "Loaded matrix"
        );
        Ok(matrix)
    }

    fn load_labels(&self, path: &Path) -> Result<Vec<bool>> {
        let labels = parse_labels(BufReader::new(File::open(path)?))?;
        debug!(path = %path.display(), labels = labels.len(), "Loaded labels");
        Ok(labels)
    }
}

/// Read a whitespace-delimited matrix. Blank lines are skipped.
pub fn parse_matrix<R: BufRead>(reader: R) -> Result<FeatureMatrix> {
    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| AnomalyError::Parse {
                    line: line_no + 1,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }
    FeatureMatrix::from_rows(rows)
}

/// Read one label per line: `true` in any case is true, anything else false.
pub fn parse_labels<R: BufRead>(reader: R) -> Result<Vec<bool>> {
    let mut labels = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        labels.push(token.eq_ignore_ascii_case("true"));
    }
    Ok(labels)
}
