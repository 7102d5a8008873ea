//! Windowed regressor wrapper
//!
//! [`TimeSeriesRegressor`] adapts any [`Estimator`] fit on independent
//! samples to sequential data. Inputs are windowed and flattened, then
//! handed to either one shared model or one model per target column.

use super::config::TimeSeriesConfig;
use crate::error::{Result, TimeSeriesError};
use crate::sequence::Sequence;
use crate::training::{r2_score, Estimator, ParamValue, Params, ScoreOptions};
use crate::windowing::{window_dataset, WindowSpec};
use ndarray::{s, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Models produced by a fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FittedModels<E> {
    /// One model for every target column
    Shared(E),
    /// One model per target column, in column order
    PerOutput(Vec<E>),
}

impl<E> FittedModels<E> {
    pub fn len(&self) -> usize {
        match self {
            FittedModels::Shared(_) => 1,
            FittedModels::PerOutput(models) => models.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_per_output(&self) -> bool {
        matches!(self, FittedModels::PerOutput(_))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        match self {
            FittedModels::Shared(model) => std::slice::from_ref(model).iter(),
            FittedModels::PerOutput(models) => models.iter(),
        }
    }
}

/// Sliding-window adapter around a point-prediction estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesRegressor<E> {
    config: TimeSeriesConfig,
    base_estimator: E,
    fitted: Option<FittedModels<E>>,
    n_outputs: Option<usize>,
}

impl<E: Estimator> TimeSeriesRegressor<E> {
    /// Wrap `base_estimator`, which serves as the prototype for every fit
    pub fn new(base_estimator: E, config: TimeSeriesConfig) -> Self {
        Self {
            config,
            base_estimator,
            fitted: None,
            n_outputs: None,
        }
    }

    /// Wrap `base_estimator` after applying `params` to it
    pub fn with_base_params<I, S>(mut base_estimator: E, config: TimeSeriesConfig, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ParamValue)>,
        S: AsRef<str>,
    {
        for (name, value) in params {
            base_estimator.set_param(name.as_ref(), value)?;
        }
        Ok(Self::new(base_estimator, config))
    }

    pub fn config(&self) -> &TimeSeriesConfig {
        &self.config
    }

    pub fn window(&self) -> WindowSpec {
        self.config.window()
    }

    /// The unfitted prototype
    pub fn base_estimator(&self) -> &E {
        &self.base_estimator
    }

    pub fn fitted_models(&self) -> Option<&FittedModels<E>> {
        self.fitted.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Number of target columns seen at fit time
    pub fn n_outputs(&self) -> Option<usize> {
        self.n_outputs
    }

    /// Windowed, flattened features and aligned targets
    fn preprocess(&self, x: &Sequence, y: Option<&Sequence>) -> Result<(Array2<f64>, Array2<f64>)> {
        Ok(window_dataset(x, y, self.window())?.into_flat())
    }

    /// Fit on `x`, predicting `y` when given and `x` itself otherwise.
    ///
    /// Any previous fit is discarded first.
    pub fn fit(&mut self, x: &Sequence, y: Option<&Sequence>) -> Result<&mut Self> {
        self.fitted = None;
        self.n_outputs = None;

        let (features, targets) = self.preprocess(x, y)?;
        let n_outputs = targets.ncols();

        let fitted = if self.config.parallel_models && n_outputs > 1 {
            let base = &self.base_estimator;
            let models = (0..n_outputs)
                .into_par_iter()
                .map(|j| -> Result<E> {
                    let mut model = base.clone_unfitted();
                    let column = targets.slice(s![.., j..j + 1]).to_owned();
                    model.fit(&features, &column)?;
                    Ok(model)
                })
                .collect::<Result<Vec<E>>>()?;
            FittedModels::PerOutput(models)
        } else {
            let mut model = self.base_estimator.clone_unfitted();
            model.fit(&features, &targets)?;
            FittedModels::Shared(model)
        };

        debug!(
            n_samples = features.nrows(),
            n_features = features.ncols(),
            n_outputs,
            n_models = fitted.len(),
            estimator = %self.base_estimator.name(),
            "Fitted windowed estimator"
        );

        self.fitted = Some(fitted);
        self.n_outputs = Some(n_outputs);
        Ok(self)
    }

    /// Predict the target for every complete window of `x`.
    ///
    /// Row `i` predicts the observation at `i + n_prev - 1 + n_ahead`; see
    /// [`align_targets`](crate::windowing::align_targets) for the matching
    /// ground truth.
    pub fn predict(&self, x: &Sequence) -> Result<Array2<f64>> {
        let fitted = self.fitted.as_ref().ok_or(TimeSeriesError::NotFitted)?;
        let (features, _) = self.preprocess(x, None)?;
        predict_with(fitted, &features)
    }

    /// Score predictions for `x` against `y`.
    ///
    /// A shared model scores itself with `options`. Per-output models are
    /// scored together: their assembled predictions are compared with R².
    pub fn score(&self, x: &Sequence, y: &Sequence, options: &ScoreOptions) -> Result<f64> {
        let fitted = self.fitted.as_ref().ok_or(TimeSeriesError::NotFitted)?;
        let (features, targets) = self.preprocess(x, Some(y))?;

        match fitted {
            FittedModels::Shared(model) => model.score(&features, &targets, options),
            FittedModels::PerOutput(models) => {
                debug!(n_models = models.len(), "Scoring per-output models jointly");
                let predictions = predict_with(fitted, &features)?;
                r2_score(&targets, &predictions, options)
            }
        }
    }

    /// Route each parameter to the wrapper's own configuration or to the
    /// wrapped prototype.
    ///
    /// Changing `n_prev` or `n_ahead` discards the current fit, since the
    /// fitted models expect the old feature width.
    pub fn set_params<I, S>(&mut self, params: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (S, ParamValue)>,
        S: AsRef<str>,
    {
        for (name, value) in params {
            let name = name.as_ref();
            if TimeSeriesConfig::recognizes(name) {
                let window_before = self.window();
                self.config.set_param(name, &value)?;
                if self.window() != window_before && self.fitted.is_some() {
                    debug!(param = name, value = %value, "Window changed, discarding fitted models");
                    self.fitted = None;
                    self.n_outputs = None;
                }
            } else {
                debug!(param = name, value = %value, "Forwarding parameter to base estimator");
                self.base_estimator.set_param(name, value)?;
            }
        }
        Ok(self)
    }

    /// Wrapper parameters merged with the prototype's
    pub fn get_params(&self) -> Params {
        let mut params = self.base_estimator.get_params();
        params.extend(self.config.get_params());
        params
    }
}

fn predict_with<E: Estimator>(fitted: &FittedModels<E>, features: &Array2<f64>) -> Result<Array2<f64>> {
    match fitted {
        FittedModels::Shared(model) => model.predict(features),
        FittedModels::PerOutput(models) => {
            let columns = models
                .iter()
                .map(|model| model.predict(features))
                .collect::<Result<Vec<_>>>()?;
            let views: Vec<_> = columns.iter().map(|c| c.view()).collect();
            Ok(ndarray::concatenate(Axis(1), &views)?)
        }
    }
}

impl<E: Estimator> fmt::Display for TimeSeriesRegressor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .base_estimator
            .get_params()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        write!(
            f,
            "TimeSeriesRegressor: {}({})",
            self.base_estimator.name(),
            params.join(", ")
        )
    }
}
