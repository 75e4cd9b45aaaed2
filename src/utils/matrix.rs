use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{AnomalyError, Result};

/// Rectangular examples x features matrix of doubles.
///
/// Once built the matrix is never mutated; training and test sets are
/// independent values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f64>,
}

impl FeatureMatrix {
    /// Build a matrix from row vectors, rejecting ragged or empty input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || n_features == 0 {
            return Err(AnomalyError::EmptyMatrix);
        }

        for (index, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(AnomalyError::MalformedMatrix {
                    row: index,
                    expected: n_features,
                    found: row.len(),
                });
            }
        }

        let data = Array2::from_shape_fn((rows.len(), n_features), |(i, j)| rows[i][j]);
        Ok(FeatureMatrix { data })
    }

    /// Wrap an existing array. Only the emptiness check applies, since an
    /// `Array2` is rectangular by construction.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(AnomalyError::EmptyMatrix);
        }
        Ok(FeatureMatrix { data })
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.row(index)
    }

    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.column(index)
    }

    /// Rows in input order.
    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> + '_ {
        self.data.axis_iter(Axis(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_keeps_order() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let m = FeatureMatrix::from_rows(rows).unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_features(), 2);
        assert_eq!(m.row(1).to_vec(), vec![3.0, 4.0]);
        assert_eq!(m.column(1).to_vec(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        match err {
            AnomalyError::MalformedMatrix { row, expected, found } => {
                assert_eq!((row, expected, found), (1, 2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(FeatureMatrix::from_rows(vec![]), Err(AnomalyError::EmptyMatrix)));
        assert!(matches!(
            FeatureMatrix::from_rows(vec![vec![], vec![]]),
            Err(AnomalyError::EmptyMatrix)
        ));
        assert!(matches!(
            FeatureMatrix::from_array(Array2::zeros((0, 3))),
            Err(AnomalyError::EmptyMatrix)
        ));
    }
}
