//! Regression metrics

use super::models::{MultiOutput, ScoreOptions};
use crate::error::{Result, TimeSeriesError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

fn check_shapes(y_true: &Array2<f64>, y_pred: &Array2<f64>) -> Result<()> {
    if y_true.dim() != y_pred.dim() {
        return Err(TimeSeriesError::ShapeMismatch {
            expected: format!("predictions of shape {:?}", y_true.dim()),
            actual: format!("predictions of shape {:?}", y_pred.dim()),
        });
    }
    if y_true.nrows() == 0 {
        return Err(TimeSeriesError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(())
}

fn resolve_weights(n_samples: usize, options: &ScoreOptions) -> Result<Array1<f64>> {
    match &options.sample_weight {
        Some(w) if w.len() != n_samples => Err(TimeSeriesError::ShapeMismatch {
            expected: format!("sample_weight length = {}", n_samples),
            actual: format!("sample_weight length = {}", w.len()),
        }),
        Some(w) => Ok(w.clone()),
        None => Ok(Array1::ones(n_samples)),
    }
}

/// Coefficient of determination.
///
/// Constant targets score 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(y_true: &Array2<f64>, y_pred: &Array2<f64>, options: &ScoreOptions) -> Result<f64> {
    check_shapes(y_true, y_pred)?;
    let weights = resolve_weights(y_true.nrows(), options)?;
    let weight_sum = weights.sum();
    if weight_sum <= 0.0 {
        return Err(TimeSeriesError::invalid_parameter(
            "sample_weight",
            weight_sum,
            "weights must sum to a positive value",
        ));
    }

    let mut scores = Vec::with_capacity(y_true.ncols());
    let mut denominators = Vec::with_capacity(y_true.ncols());

    for (t, p) in y_true.columns().into_iter().zip(y_pred.columns()) {
        let mean = t.iter().zip(weights.iter()).map(|(v, w)| v * w).sum::<f64>() / weight_sum;
        let ss_res: f64 = t
            .iter()
            .zip(p.iter())
            .zip(weights.iter())
            .map(|((a, b), w)| w * (a - b).powi(2))
            .sum();
        let ss_tot: f64 = t
            .iter()
            .zip(weights.iter())
            .map(|(a, w)| w * (a - mean).powi(2))
            .sum();

        let score = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };
        scores.push(score);
        denominators.push(ss_tot);
    }

    let total_denominator: f64 = denominators.iter().sum();
    let score = match options.multioutput {
        MultiOutput::VarianceWeighted if total_denominator > 0.0 => scores
            .iter()
            .zip(denominators.iter())
            .map(|(s, d)| s * d)
            .sum::<f64>()
            / total_denominator,
        _ => scores.iter().sum::<f64>() / scores.len() as f64,
    };

    Ok(score)
}

/// Mean squared error averaged over all outputs
pub fn mean_squared_error(y_true: &Array2<f64>, y_pred: &Array2<f64>) -> Result<f64> {
    check_shapes(y_true, y_pred)?;
    let diff = y_true - y_pred;
    Ok(diff.mapv(|v| v * v).mean().unwrap_or(0.0))
}

/// Mean absolute error averaged over all outputs
pub fn mean_absolute_error(y_true: &Array2<f64>, y_pred: &Array2<f64>) -> Result<f64> {
    check_shapes(y_true, y_pred)?;
    let diff = y_true - y_pred;
    Ok(diff.mapv(f64::abs).mean().unwrap_or(0.0))
}

/// Summary of forecast quality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// R-squared, uniform average over outputs
    pub r2: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    pub fn compute(y_true: &Array2<f64>, y_pred: &Array2<f64>) -> Result<Self> {
        let mse = mean_squared_error(y_true, y_pred)?;
        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae: mean_absolute_error(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred, &ScoreOptions::default())?,
            n_samples: y_true.nrows(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_prediction() {
        let y = array![[1.0], [2.0], [3.0]];
        assert_eq!(r2_score(&y, &y, &ScoreOptions::default()).unwrap(), 1.0);
    }

    #[test]
    fn test_mean_prediction_scores_zero() {
        let y = array![[1.0], [2.0], [3.0]];
        let pred = array![[2.0], [2.0], [2.0]];
        let score = r2_score(&y, &pred, &ScoreOptions::default()).unwrap();
        assert!(score.abs() < 1e-12);
    }

    #[test]
    fn test_constant_target() {
        let y = array![[5.0], [5.0]];
        let off = array![[5.0], [6.0]];
        assert_eq!(r2_score(&y, &y, &ScoreOptions::default()).unwrap(), 1.0);
        assert_eq!(r2_score(&y, &off, &ScoreOptions::default()).unwrap(), 0.0);
    }

    #[test]
    fn test_sample_weight_zero_ignores_row() {
        let y = array![[1.0], [2.0], [3.0], [100.0]];
        let pred = array![[1.0], [2.0], [3.0], [0.0]];
        let options = ScoreOptions::new().with_sample_weight(array![1.0, 1.0, 1.0, 0.0]);
        assert!((r2_score(&y, &pred, &options).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_weight_length_checked() {
        let y = array![[1.0], [2.0]];
        let options = ScoreOptions::new().with_sample_weight(array![1.0]);
        assert!(matches!(
            r2_score(&y, &y, &options),
            Err(TimeSeriesError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_multioutput_averaging() {
        // First column perfect (r2 = 1), second predicted by its mean (r2 = 0)
        let y = array![[1.0, 0.0], [2.0, 10.0], [3.0, 20.0]];
        let pred = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]];

        let uniform = r2_score(&y, &pred, &ScoreOptions::default()).unwrap();
        assert!((uniform - 0.5).abs() < 1e-12);

        let weighted = r2_score(
            &y,
            &pred,
            &ScoreOptions::new().with_multioutput(MultiOutput::VarianceWeighted),
        )
        .unwrap();
        // Variances 2 and 200: (1 * 2 + 0 * 200) / 202
        assert!((weighted - 2.0 / 202.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let y = array![[1.0], [2.0]];
        let pred = array![[1.0, 2.0], [2.0, 3.0]];
        assert!(r2_score(&y, &pred, &ScoreOptions::default()).is_err());
    }

    #[test]
    fn test_regression_metrics() {
        let y_true = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y_pred = array![[1.1], [2.0], [2.9], [4.1], [5.0]];

        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert!((metrics.mse - 0.006).abs() < 1e-9);
        assert!((metrics.mae - 0.06).abs() < 1e-9);
        assert!(metrics.r2 > 0.99);
        assert_eq!(metrics.n_samples, 5);
    }
}
