//! Flattening of windowed tensors into feature rows
//!
//! Layout is time-step-major, feature-minor: a window of `n_prev` steps with
//! `F` features becomes `[t0f0, t0f1, .., t0fF, t1f0, ..]`.

use crate::error::{Result, TimeSeriesError};
use ndarray::{Array2, Array3, ArrayView1};

/// Collapse `samples x n_prev x features` into `samples x (n_prev * features)`
pub fn flatten_windows(windows: &Array3<f64>) -> Array2<f64> {
    let (n_samples, n_prev, n_features) = windows.dim();
    Array2::from_shape_fn((n_samples, n_prev * n_features), |(i, k)| {
        windows[[i, k / n_features, k % n_features]]
    })
}

/// Restore one flattened row to its `n_prev x features` window
pub fn unflatten_row(row: ArrayView1<'_, f64>, n_prev: usize, n_features: usize) -> Result<Array2<f64>> {
    if row.len() != n_prev * n_features {
        return Err(TimeSeriesError::ShapeMismatch {
            expected: format!("row length = {}", n_prev * n_features),
            actual: format!("row length = {}", row.len()),
        });
    }
    Ok(Array2::from_shape_vec((n_prev, n_features), row.to_vec())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_flatten_layout() {
        let windows = array![
            [[1.0, 10.0], [2.0, 20.0]],
            [[2.0, 20.0], [3.0, 30.0]]
        ];
        let flat = flatten_windows(&windows);
        assert_eq!(flat, array![[1.0, 10.0, 2.0, 20.0], [2.0, 20.0, 3.0, 30.0]]);
    }

    #[test]
    fn test_round_trip() {
        let windows = Array3::from_shape_fn((4, 3, 2), |(i, t, j)| (i * 100 + t * 10 + j) as f64);
        let flat = flatten_windows(&windows);

        for i in 0..4 {
            let restored = unflatten_row(flat.row(i), 3, 2).unwrap();
            assert_eq!(restored, windows.index_axis(ndarray::Axis(0), i));
        }
    }

    #[test]
    fn test_empty_feature_axis() {
        let windows = Array3::<f64>::zeros((2, 3, 0));
        assert_eq!(flatten_windows(&windows).dim(), (2, 0));
    }

    #[test]
    fn test_unflatten_wrong_length() {
        let row = array![1.0, 2.0, 3.0];
        assert!(unflatten_row(row.view(), 2, 2).is_err());
    }
}
