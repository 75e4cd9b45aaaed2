//! Dense linear algebra for small symmetric positive-definite matrices.

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{AnomalyError, Result};

/// A pivot at or below this fraction of its own diagonal entry is treated
/// as zero.
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-12;

/// Lower-triangular Cholesky factor L with A = L * L^T.
#[derive(Debug, Clone)]
pub struct Cholesky {
    lower: Array2<f64>,
}

impl Cholesky {
    /// Factor a symmetric matrix, failing with `SingularCovariance` when it
    /// is not numerically positive definite.
    pub fn factor(a: &Array2<f64>) -> Result<Self> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(AnomalyError::DimensionMismatch {
                expected: n,
                found: a.ncols(),
            });
        }

        let mut l = Array2::<f64>::zeros((n, n));

        for i in 0..n {
            for j in 0..=i {
                let mut sum = a[[i, j]];
                for k in 0..j {
                    sum -= l[[i, k]] * l[[j, k]];
                }

                if i == j {
                    let tolerance = a[[i, i]] * RELATIVE_PIVOT_TOLERANCE;
                    if !(a[[i, i]] > 0.0 && sum > tolerance) {
                        return Err(AnomalyError::SingularCovariance { pivot: i });
                    }
                    l[[i, j]] = sum.sqrt();
                } else {
                    l[[i, j]] = sum / l[[j, j]];
                }
            }
        }

        Ok(Cholesky { lower: l })
    }

    pub fn dim(&self) -> usize {
        self.lower.nrows()
    }

    /// ln det(A) = 2 * sum(ln L_ii)
    pub fn log_determinant(&self) -> f64 {
        2.0 * self.lower.diag().iter().map(|d| d.ln()).sum::<f64>()
    }

    pub fn determinant(&self) -> f64 {
        self.lower.diag().iter().map(|d| d * d).product()
    }

    /// x^T * A^-1 * x, computed as |L^-1 x|^2 by forward substitution.
    pub fn mahalanobis_squared(&self, x: ArrayView1<'_, f64>) -> f64 {
        let y = self.forward_substitute(x);
        y.dot(&y)
    }

    fn forward_substitute(&self, b: ArrayView1<'_, f64>) -> Array1<f64> {
        let n = self.dim();
        let mut y = Array1::<f64>::zeros(n);
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.lower[[i, k]] * y[k];
            }
            y[i] = sum / self.lower[[i, i]];
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_factor_reconstructs_matrix() {
        let a = array![[4.0, 2.0, 0.6], [2.0, 5.0, 1.0], [0.6, 1.0, 3.0]];
        let chol = Cholesky::factor(&a).unwrap();
        let rebuilt = chol.lower.dot(&chol.lower.t());
        for (x, y) in rebuilt.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_determinant_of_2x2() {
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let chol = Cholesky::factor(&a).unwrap();
        assert!((chol.determinant() - 3.0).abs() < 1e-12);
        assert!((chol.log_determinant() - 3.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_mahalanobis_matches_explicit_inverse() {
        // inverse of [[2, 1], [1, 2]] is [[2, -1], [-1, 2]] / 3
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let chol = Cholesky::factor(&a).unwrap();
        let x = array![1.0, -2.0];
        let expected = (2.0 * 1.0 + 2.0 * 1.0 * 2.0 + 2.0 * 4.0) / 3.0;
        assert!((chol.mahalanobis_squared(x.view()) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let collinear = array![[4.0, 4.0], [4.0, 4.0]];
        assert!(matches!(
            Cholesky::factor(&collinear),
            Err(AnomalyError::SingularCovariance { pivot: 1 })
        ));

        let zeros = Array2::<f64>::zeros((2, 2));
        assert!(matches!(
            Cholesky::factor(&zeros),
            Err(AnomalyError::SingularCovariance { pivot: 0 })
        ));
    }

    #[test]
    fn test_mixed_scales_are_not_singular() {
        let a = array![[1e8, 0.0], [0.0, 1e-6]];
        let chol = Cholesky::factor(&a).unwrap();
        assert!((chol.determinant() - 1e2).abs() < 1e-10);

        // Correlated pair on very different scales.
        let b = array![[1e12, 0.5], [0.5, 1e-6]];
        assert!(Cholesky::factor(&b).is_ok());
    }

    #[test]
    fn test_rank_one_matrix_rejected() {
        // Covariance of two rows, three features: d * d^T with d = (1, 2, 3).
        let a = array![[2.0, 4.0, 6.0], [4.0, 8.0, 12.0], [6.0, 12.0, 18.0]];
        assert!(matches!(
            Cholesky::factor(&a),
            Err(AnomalyError::SingularCovariance { pivot: 1 })
        ));
    }

    #[test]
    fn test_non_square_rejected() {
        let a = Array2::<f64>::zeros((2, 3));
        assert!(matches!(Cholesky::factor(&a), Err(AnomalyError::DimensionMismatch { .. })));
    }
}
