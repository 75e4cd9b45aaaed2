use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::Result;
use crate::models::base_model::DensityModel;
use crate::models::univariate::check_dimensions;
use crate::utils::linalg::Cholesky;
use crate::utils::stats::FeatureStatistics;

/// Joint Gaussian density of `x` under N(mean, covariance).
///
/// Fails with `SingularCovariance` if the covariance is not invertible.
pub fn multivariate_density(
    x: ArrayView1<'_, f64>,
    mean: ArrayView1<'_, f64>,
    covariance: &Array2<f64>,
) -> Result<f64> {
    let model = MultivariateGaussian::new(mean.to_owned(), covariance)?;
    model.density(x)
}

/// Full-covariance Gaussian model. The covariance is factored once when
/// the model is built and reused for every scored example.
#[derive(Debug, Clone)]
pub struct MultivariateGaussian {
    mean: Array1<f64>,
    factor: Cholesky,
    // ln of the normalising constant: -(k ln(2 pi) + ln det) / 2
    log_normalizer: f64,
}

impl MultivariateGaussian {
    pub fn new(mean: Array1<f64>, covariance: &Array2<f64>) -> Result<Self> {
        check_dimensions(mean.len(), covariance.nrows())?;
        let factor = Cholesky::factor(covariance)?;

        let k = mean.len() as f64;
        let log_normalizer = -0.5 * (k * (2.0 * PI).ln() + factor.log_determinant());

        Ok(MultivariateGaussian {
            mean,
            factor,
            log_normalizer,
        })
    }

    pub fn fit(stats: &FeatureStatistics) -> Result<Self> {
        Self::new(stats.mean().to_owned(), stats.covariance())
    }

    pub fn log_density(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        check_dimensions(self.mean.len(), x.len())?;
        let diff = &x - &self.mean;
        Ok(self.log_normalizer - 0.5 * self.factor.mahalanobis_squared(diff.view()))
    }

    pub fn covariance_determinant(&self) -> f64 {
        self.factor.determinant()
    }
}

impl DensityModel for MultivariateGaussian {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn density(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        Ok(self.log_density(x)?.exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnomalyError;
    use crate::models::univariate::univariate_density;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_standard_bivariate_at_mean() {
        let cov = Array2::eye(2);
        let origin = array![0.0, 0.0];
        let p = multivariate_density(origin.view(), origin.view(), &cov).unwrap();
        assert!((p - 1.0 / (2.0 * PI)).abs() < 1e-15);
    }

    #[test]
    fn test_correlated_density_closed_form() {
        // cov = [[2, 1], [1, 2]], det = 3, inverse = [[2, -1], [-1, 2]] / 3
        let cov = array![[2.0, 1.0], [1.0, 2.0]];
        let x = array![1.0, -2.0];
        let mean = array![0.0, 0.0];
        let maha: f64 = 14.0 / 3.0;
        let expected = (-0.5 * maha).exp() / (2.0 * PI * 3.0_f64.sqrt());
        let p = multivariate_density(x.view(), mean.view(), &cov).unwrap();
        assert!((p - expected).abs() <= 1e-12 * expected);
    }

    #[test]
    fn test_diagonal_covariance_reduces_to_univariate() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let k = rng.gen_range(1..6);
            let mean: Array1<f64> = (0..k).map(|_| rng.gen_range(-10.0..10.0)).collect();
            let std: Array1<f64> = (0..k).map(|_| rng.gen_range(0.1..5.0)).collect();
            let cov = Array2::from_diag(&std.mapv(|s| s * s));
            let model = MultivariateGaussian::new(mean.clone(), &cov).unwrap();

            for _ in 0..10 {
                // Stay within a few deviations so neither form underflows.
                let x: Array1<f64> = (0..k)
                    .map(|j| mean[j] + std[j] * rng.gen_range(-3.0..3.0))
                    .collect();
                let uni = univariate_density(x.view(), mean.view(), std.view()).unwrap();
                let multi = model.density(x.view()).unwrap();
                assert!(
                    (uni - multi).abs() <= 1e-9 * uni,
                    "univariate {uni} vs multivariate {multi}"
                );
            }
        }
    }

    #[test]
    fn test_mixed_scale_diagonal_matches_univariate() {
        let mean = array![0.0, 0.0];
        let std = array![1e4, 1e-3];
        let cov = Array2::from_diag(&std.mapv(|s| s * s));
        let x = array![1e4, 1e-3];

        let uni = univariate_density(x.view(), mean.view(), std.view()).unwrap();
        let multi = multivariate_density(x.view(), mean.view(), &cov).unwrap();
        assert!(
            (uni - multi).abs() <= 1e-9 * uni,
            "univariate {uni} vs multivariate {multi}"
        );
    }

    #[test]
    fn test_collinear_features_are_singular() {
        let cov = array![[4.0, 4.0], [4.0, 4.0]];
        assert!(matches!(
            MultivariateGaussian::new(array![3.0, 4.0], &cov),
            Err(AnomalyError::SingularCovariance { .. })
        ));
    }

    #[test]
    fn test_determinant_exposed() {
        let cov = array![[2.0, 1.0], [1.0, 2.0]];
        let model = MultivariateGaussian::new(array![0.0, 0.0], &cov).unwrap();
        assert!((model.covariance_determinant() - 3.0).abs() < 1e-12);
        assert_eq!(model.n_features(), 2);
    }

    #[test]
    fn test_dimension_mismatch() {
        let cov = Array2::eye(2);
        assert!(matches!(
            MultivariateGaussian::new(array![0.0, 0.0, 0.0], &cov),
            Err(AnomalyError::DimensionMismatch { expected: 3, found: 2 })
        ));
        let model = MultivariateGaussian::new(array![0.0, 0.0], &cov).unwrap();
        assert!(matches!(
            model.density(array![1.0].view()),
            Err(AnomalyError::DimensionMismatch { expected: 2, found: 1 })
        ));
    }
}
