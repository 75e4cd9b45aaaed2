use ndarray::ArrayView1;

use crate::error::Result;
use crate::utils::matrix::FeatureMatrix;

/// Common contract for fitted Gaussian density models.
pub trait DensityModel {
    /// Number of features a scored example must have.
    fn n_features(&self) -> usize;

    /// Density of one example under the fitted distribution.
    fn density(&self, x: ArrayView1<'_, f64>) -> Result<f64>;

    /// Default: score every row, in order, stopping at the first error.
    fn score(&self, xs: &FeatureMatrix) -> Result<Vec<f64>> {
        xs.rows().map(|x| self.density(x)).collect()
    }
}
