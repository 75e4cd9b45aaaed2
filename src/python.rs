use numpy::{IntoPyArray, PyArray1, PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::detector::{classify_with_model, flags, validate_epsilon};
use crate::error::AnomalyError;
use crate::models::base_model::DensityModel;
use crate::models::{GaussianModel, ModelKind};
use crate::utils::evaluation;
use crate::utils::matrix::FeatureMatrix;
use crate::utils::stats::{estimate, FeatureStatistics};

impl From<AnomalyError> for PyErr {
    fn from(err: AnomalyError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn to_matrix(x: PyReadonlyArray2<f64>) -> PyResult<FeatureMatrix> {
    Ok(FeatureMatrix::from_array(x.as_array().to_owned())?)
}

/// Python-exposed Gaussian anomaly detector.
#[pyclass]
pub struct GaussianDetector {
    kind: ModelKind,
    epsilon: f64,
    statistics: Option<FeatureStatistics>,
    model: Option<GaussianModel>,
}

impl GaussianDetector {
    fn fitted(&self) -> PyResult<&GaussianModel> {
        self.model
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("GaussianDetector is not fitted"))
    }
}

#[pymethods]
impl GaussianDetector {
    #[new]
    #[pyo3(signature = (model="univariate", epsilon=0.0005))]
    fn new(model: &str, epsilon: f64) -> PyResult<Self> {
        validate_epsilon(epsilon)?;
        Ok(GaussianDetector {
            kind: model.parse()?,
            epsilon,
            statistics: None,
            model: None,
        })
    }

    /// Estimate statistics from a training matrix (rows are examples).
    fn fit(&mut self, x: PyReadonlyArray2<f64>) -> PyResult<()> {
        let statistics = estimate(&to_matrix(x)?)?;
        self.model = Some(GaussianModel::fit(self.kind, &statistics)?);
        self.statistics = Some(statistics);
        Ok(())
    }

    /// Density of every row.
    fn score<'py>(
        &self,
        py: Python<'py>,
        x: PyReadonlyArray2<f64>,
    ) -> PyResult<&'py PyArray1<f64>> {
        let scores = self.fitted()?.score(&to_matrix(x)?)?;
        Ok(scores.into_pyarray(py))
    }

    /// Anomaly flag of every row.
    fn predict(&self, x: PyReadonlyArray2<f64>) -> PyResult<Vec<bool>> {
        let scored = classify_with_model(self.fitted()?, &to_matrix(x)?, self.epsilon)?;
        Ok(flags(&scored))
    }

    #[getter]
    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    #[getter]
    fn model(&self) -> String {
        self.kind.to_string()
    }

    #[getter]
    fn mean<'py>(&self, py: Python<'py>) -> Option<&'py PyArray1<f64>> {
        self.statistics.as_ref().map(|s| s.mean().to_pyarray(py))
    }

    #[getter]
    fn stddev<'py>(&self, py: Python<'py>) -> Option<&'py PyArray1<f64>> {
        self.statistics.as_ref().map(|s| s.stddev().to_pyarray(py))
    }
}

/// Precision, recall and F1 of predicted flags against labels.
#[pyfunction]
fn evaluate(py: Python<'_>, predicted: Vec<bool>, actual: Vec<bool>) -> PyResult<PyObject> {
    let summary = evaluation::evaluate(&predicted, &actual)?;
    let results = PyDict::new(py);
    results.set_item("true_positives", summary.true_positives)?;
    results.set_item("false_positives", summary.false_positives)?;
    results.set_item("false_negatives", summary.false_negatives)?;
    results.set_item("true_negatives", summary.true_negatives)?;
    results.set_item("precision", summary.precision)?;
    results.set_item("recall", summary.recall)?;
    results.set_item("f1", summary.f1_score)?;
    Ok(results.into())
}

pub(crate) fn register(m: &PyModule) -> PyResult<()> {
    m.add_class::<GaussianDetector>()?;
    m.add_function(wrap_pyfunction!(evaluate, m)?)?;
    Ok(())
}
