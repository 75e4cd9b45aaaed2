use std::f64::consts::PI;

use ndarray::{Array1, ArrayView1};

use crate::error::{AnomalyError, Result};
use crate::models::base_model::DensityModel;
use crate::utils::stats::FeatureStatistics;

/// Density of `x` under N(mean, stddev^2). `stddev` must be positive.
pub fn normal_density(x: f64, mean: f64, stddev: f64) -> f64 {
    let z = (x - mean) / stddev;
    (-0.5 * z * z).exp() / (stddev * (2.0 * PI).sqrt())
}

/// Product of independent per-feature Gaussian densities.
///
/// Fails with `ZeroVariance` naming the first feature whose stddev is not
/// strictly positive; that feature has to be dropped by the caller.
pub fn univariate_density(
    x: ArrayView1<'_, f64>,
    mean: ArrayView1<'_, f64>,
    stddev: ArrayView1<'_, f64>,
) -> Result<f64> {
    check_dimensions(mean.len(), x.len())?;
    check_dimensions(mean.len(), stddev.len())?;
    check_variance(stddev)?;

    Ok(product_of_densities(x, mean, stddev))
}

fn product_of_densities(
    x: ArrayView1<'_, f64>,
    mean: ArrayView1<'_, f64>,
    stddev: ArrayView1<'_, f64>,
) -> f64 {
    x.iter()
        .zip(mean.iter())
        .zip(stddev.iter())
        .map(|((&v, &m), &s)| normal_density(v, m, s))
        .product()
}

fn check_variance(stddev: ArrayView1<'_, f64>) -> Result<()> {
    match stddev.iter().position(|&s| !(s > 0.0)) {
        Some(feature) => Err(AnomalyError::ZeroVariance { feature }),
        None => Ok(()),
    }
}

pub(crate) fn check_dimensions(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(AnomalyError::DimensionMismatch { expected, found });
    }
    Ok(())
}

/// Independent-feature Gaussian model with validated parameters.
#[derive(Debug, Clone)]
pub struct UnivariateGaussian {
    mean: Array1<f64>,
    stddev: Array1<f64>,
}

impl UnivariateGaussian {
    pub fn new(mean: Array1<f64>, stddev: Array1<f64>) -> Result<Self> {
        check_dimensions(mean.len(), stddev.len())?;
        check_variance(stddev.view())?;
        Ok(UnivariateGaussian { mean, stddev })
    }

    pub fn fit(stats: &FeatureStatistics) -> Result<Self> {
        Self::new(stats.mean().to_owned(), stats.stddev().to_owned())
    }
}

impl DensityModel for UnivariateGaussian {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn density(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        check_dimensions(self.mean.len(), x.len())?;
        Ok(product_of_densities(x, self.mean.view(), self.stddev.view()))
    }
}
