//! Sliding-window construction
//!
//! Turns a chronological [`Sequence`] into supervised samples: each sample is
//! `n_prev` consecutive observations, and its target is the observation
//! `n_ahead` steps past the end of that window.
//!
//! For window start `i` the target row is `i + n_prev - 1 + n_ahead`, so a
//! sequence of length `L` yields `L - n_prev + 1 - n_ahead` samples.

mod flatten;

pub use flatten::{flatten_windows, unflatten_row};

use crate::error::{Result, TimeSeriesError};
use crate::sequence::Sequence;
use ndarray::{s, Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Window length and forecast horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Number of past observations per sample
    pub n_prev: usize,
    /// Steps beyond the window's last observation to predict
    pub n_ahead: usize,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            n_prev: 3,
            n_ahead: 1,
        }
    }
}

impl WindowSpec {
    pub fn new(n_prev: usize, n_ahead: usize) -> Self {
        Self { n_prev, n_ahead }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_prev == 0 {
            return Err(TimeSeriesError::invalid_parameter(
                "n_prev",
                self.n_prev,
                "window must contain at least one observation",
            ));
        }
        Ok(())
    }

    /// Row offset of a window's target relative to the window start
    pub fn target_offset(&self) -> usize {
        self.n_prev.saturating_sub(1).saturating_add(self.n_ahead)
    }

    /// Shortest sequence that still produces one sample, `None` when that
    /// length is not representable
    pub fn min_length(&self) -> Option<usize> {
        self.n_prev.checked_add(self.n_ahead)
    }

    /// Number of samples a sequence of `len` observations yields
    pub fn n_windows(&self, len: usize) -> Result<usize> {
        self.validate()?;
        match self.min_length() {
            Some(required) if len >= required => Ok(len + 1 - required),
            required => Err(TimeSeriesError::InsufficientData {
                required: required.unwrap_or(usize::MAX),
                actual: len,
            }),
        }
    }
}

/// Windows and their aligned targets
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedDataset {
    /// `samples x n_prev x features`
    pub windows: Array3<f64>,
    /// `samples x target features`
    pub targets: Array2<f64>,
}

impl WindowedDataset {
    pub fn n_samples(&self) -> usize {
        self.windows.shape()[0]
    }

    /// Windows reshaped into flat feature rows
    pub fn features(&self) -> Array2<f64> {
        flatten_windows(&self.windows)
    }

    /// Flat feature rows and targets, consuming the dataset
    pub fn into_flat(self) -> (Array2<f64>, Array2<f64>) {
        (flatten_windows(&self.windows), self.targets)
    }
}

/// Build windows over `x` with targets from `y`, or from `x` itself when no
/// target sequence is given.
pub fn window_dataset(x: &Sequence, y: Option<&Sequence>, spec: WindowSpec) -> Result<WindowedDataset> {
    if let Some(y) = y {
        if y.len() != x.len() {
            return Err(TimeSeriesError::ShapeMismatch {
                expected: format!("target length = {}", x.len()),
                actual: format!("target length = {}", y.len()),
            });
        }
    }

    let n_samples = spec.n_windows(x.len())?;
    let n_features = x.n_features();
    let values = x.values();

    let windows = Array3::from_shape_fn((n_samples, spec.n_prev, n_features), |(i, t, j)| {
        values[[i + t, j]]
    });

    let source = y.unwrap_or(x);
    let offset = spec.target_offset();
    let targets = source
        .values()
        .slice(s![offset..offset + n_samples, ..])
        .to_owned();

    debug!(
        n_samples,
        n_prev = spec.n_prev,
        n_ahead = spec.n_ahead,
        n_features,
        n_targets = targets.ncols(),
        self_supervised = y.is_none(),
        "Built windowed dataset"
    );

    Ok(WindowedDataset { windows, targets })
}

/// Rows of `y` lined up with the samples `window_dataset` would produce,
/// i.e. the ground truth for each prediction.
pub fn align_targets(y: &Sequence, spec: WindowSpec) -> Result<Array2<f64>> {
    spec.n_windows(y.len())?;
    Ok(y.values().slice(s![spec.target_offset().., ..]).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn counting(n: usize) -> Sequence {
        Sequence::from(Array1::range(0.0, n as f64, 1.0))
    }

    #[test]
    fn test_window_count() {
        let seq = counting(10);
        for (n_prev, n_ahead) in [(1, 0), (3, 1), (5, 5), (10, 0), (2, 3)] {
            let data = window_dataset(&seq, None, WindowSpec::new(n_prev, n_ahead)).unwrap();
            assert_eq!(data.n_samples(), 10 - n_prev + 1 - n_ahead);
            assert_eq!(data.targets.nrows(), data.n_samples());
        }
    }

    #[test]
    fn test_first_window_targets_next_value() {
        let data = window_dataset(&counting(10), None, WindowSpec::new(3, 1)).unwrap();
        assert_eq!(data.windows.shape(), &[7, 3, 1]);
        assert_eq!(data.features().row(0), array![0.0, 1.0, 2.0]);
        assert_eq!(data.targets[[0, 0]], 3.0);
        assert_eq!(data.targets[[6, 0]], 9.0);
    }

    #[test]
    fn test_zero_horizon_targets_last_window_row() {
        let data = window_dataset(&counting(5), None, WindowSpec::new(2, 0)).unwrap();
        assert_eq!(data.n_samples(), 4);
        assert_eq!(data.targets.column(0), array![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_separate_target() {
        let x = Sequence::from(array![[0.0, 10.0], [1.0, 11.0], [2.0, 12.0], [3.0, 13.0]]);
        let y = Sequence::from(array![100.0, 101.0, 102.0, 103.0]);

        let data = window_dataset(&x, Some(&y), WindowSpec::new(2, 1)).unwrap();
        assert_eq!(data.n_samples(), 2);
        assert_eq!(data.targets, array![[102.0], [103.0]]);
        assert_eq!(data.features().row(1), array![1.0, 11.0, 2.0, 12.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let x = counting(6);
        let y = counting(5);
        let result = window_dataset(&x, Some(&y), WindowSpec::default());
        assert!(matches!(result, Err(TimeSeriesError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_insufficient_data() {
        let result = window_dataset(&counting(4), None, WindowSpec::new(3, 2));
        assert!(matches!(
            result,
            Err(TimeSeriesError::InsufficientData { required: 5, actual: 4 })
        ));
    }

    #[test]
    fn test_huge_horizon_is_insufficient() {
        let spec = WindowSpec::new(2, usize::MAX);
        assert_eq!(spec.min_length(), None);
        assert!(matches!(
            window_dataset(&counting(10), None, spec),
            Err(TimeSeriesError::InsufficientData { required: usize::MAX, actual: 10 })
        ));
        assert!(align_targets(&counting(10), spec).is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = window_dataset(&counting(4), None, WindowSpec::new(0, 1));
        assert!(matches!(result, Err(TimeSeriesError::InvalidParameter { .. })));
    }

    #[test]
    fn test_align_targets() {
        let aligned = align_targets(&counting(6), WindowSpec::new(3, 1)).unwrap();
        assert_eq!(aligned.column(0), array![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_input_untouched() {
        let seq = counting(8);
        let before = seq.clone();
        let _ = window_dataset(&seq, None, WindowSpec::new(3, 2)).unwrap();
        assert_eq!(seq, before);
    }
}
