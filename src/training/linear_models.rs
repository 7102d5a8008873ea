//! Linear model implementations

use super::models::{Estimator, ParamValue, Params};
use crate::error::{Result, TimeSeriesError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Lower-triangular Cholesky factor of a symmetric positive-definite matrix.
/// Returns None when the matrix is not positive definite.
fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Some(l)
}

/// Solve L L^T x = b by forward then backward substitution
fn cholesky_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    x
}

/// Solve A X = B for every column of B, factoring A once.
/// Near-singular A gets a small ridge before giving up on Cholesky.
fn cholesky_solve(a: &Array2<f64>, b: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.nrows() {
        return None;
    }

    let l = cholesky(a).or_else(|| {
        let mut a_reg = a.clone();
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
        for k in 0..n {
            a_reg[[k, k]] += ridge;
        }
        cholesky(&a_reg)
    })?;

    let mut x = Array2::zeros(b.raw_dim());
    for (j, col) in b.columns().into_iter().enumerate() {
        let solved = cholesky_substitute(&l, &col.to_owned());
        x.column_mut(j).assign(&solved);
    }
    Some(x)
}

/// Matrix inversion using Gauss-Jordan elimination (fallback)
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    // Augmented matrix [M | I]
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.slice(ndarray::s![.., n..]).to_owned())
}

/// Solve (X^T X + alpha I) W = X^T Y
fn solve_normal_equations(x: &Array2<f64>, y: &Array2<f64>, alpha: f64) -> Option<Array2<f64>> {
    let mut xtx = x.t().dot(x);
    if alpha > 0.0 {
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += alpha;
        }
    }
    let xty = x.t().dot(y);

    if let Some(result) = cholesky_solve(&xtx, &xty) {
        return Some(result);
    }

    matrix_inverse(&xtx).map(|inv| inv.dot(&xty))
}

/// Multi-output linear regression with optional L2 penalty.
///
/// `alpha = 0` is ordinary least squares; `alpha > 0` is ridge regression.
/// Each output column gets its own coefficient vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients, `features x outputs`
    pub coefficients: Option<Array2<f64>>,
    /// Fitted intercept per output
    pub intercept: Option<Array1<f64>>,
    /// Whether to fit intercept
    pub fit_intercept: bool,
    /// Regularization strength (L2)
    pub alpha: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Create a new linear regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            alpha: 0.0,
        }
    }

    /// Enable/disable fitting intercept
    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Set regularization strength (Ridge regression)
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

impl Estimator for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<()> {
        let n_samples = x.nrows();

        if n_samples != y.nrows() {
            return Err(TimeSeriesError::ShapeMismatch {
                expected: format!("y rows = {}", n_samples),
                actual: format!("y rows = {}", y.nrows()),
            });
        }
        if n_samples == 0 {
            return Err(TimeSeriesError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let (coefficients, intercept) = if self.fit_intercept {
            let x_mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
            let y_mean = y.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(y.ncols()));

            let x_centered = x - &x_mean.view().insert_axis(Axis(0));
            let y_centered = y - &y_mean.view().insert_axis(Axis(0));

            let coefficients = solve_normal_equations(&x_centered, &y_centered, self.alpha)
                .ok_or_else(|| {
                    TimeSeriesError::ComputationError(
                        "Matrix is singular, cannot solve least squares".to_string(),
                    )
                })?;
            let intercept = &y_mean - &x_mean.dot(&coefficients);
            (coefficients, intercept)
        } else {
            let coefficients = solve_normal_equations(x, y, self.alpha).ok_or_else(|| {
                TimeSeriesError::ComputationError(
                    "Matrix is singular, cannot solve least squares".to_string(),
                )
            })?;
            let intercept = Array1::zeros(y.ncols());
            (coefficients, intercept)
        };

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (coefficients, intercept) = match (&self.coefficients, &self.intercept) {
            (Some(c), Some(i)) => (c, i),
            _ => return Err(TimeSeriesError::NotFitted),
        };

        if x.ncols() != coefficients.nrows() {
            return Err(TimeSeriesError::ShapeMismatch {
                expected: format!("{} features", coefficients.nrows()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.dot(coefficients) + &intercept.view().insert_axis(Axis(0)))
    }

    fn clone_unfitted(&self) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            ..self.clone()
        }
    }

    fn get_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("alpha".to_string(), ParamValue::Float(self.alpha));
        params.insert("fit_intercept".to_string(), ParamValue::Bool(self.fit_intercept));
        params
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match name {
            "alpha" => {
                let alpha = value
                    .as_float()
                    .filter(|a| *a >= 0.0)
                    .ok_or_else(|| {
                        TimeSeriesError::invalid_parameter(name, &value, "expected a non-negative number")
                    })?;
                self.alpha = alpha;
            }
            "fit_intercept" => {
                self.fit_intercept = value.as_bool().ok_or_else(|| {
                    TimeSeriesError::invalid_parameter(name, &value, "expected a boolean")
                })?;
            }
            _ => return Err(TimeSeriesError::UnrecognizedParameter(name.to_string())),
        }
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}
