//! Estimator contract and parameter model

use super::metrics::r2_score;
use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named estimator parameters, ordered by name
pub type Params = BTreeMap<String, ParamValue>;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    String(String),
    Bool(bool),
}

impl ParamValue {
    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as int; floats are accepted only when integral
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Get as non-negative count
    pub fn as_usize(&self) -> Option<usize> {
        self.as_int().and_then(|v| usize::try_from(v).ok())
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ParamValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::String(v) => write!(f, "{:?}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

/// How per-output R² scores are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MultiOutput {
    /// Plain mean over outputs
    #[default]
    UniformAverage,
    /// Mean weighted by each output's variance
    VarianceWeighted,
}

/// Options passed through to an estimator's scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreOptions {
    /// Per-sample weights (None = all equal)
    pub sample_weight: Option<Array1<f64>>,
    /// Aggregation across output columns
    pub multioutput: MultiOutput,
}

impl ScoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_weight(mut self, weights: Array1<f64>) -> Self {
        self.sample_weight = Some(weights);
        self
    }

    pub fn with_multioutput(mut self, multioutput: MultiOutput) -> Self {
        self.multioutput = multioutput;
        self
    }
}

/// Point-prediction estimator fit on independent samples.
///
/// Features are `samples x features`; targets are `samples x outputs`, with a
/// single-output problem passed as one column.
pub trait Estimator: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<()>;

    /// Make predictions, one row per sample
    fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Goodness of fit, R² of `predict(x)` against `y` unless overridden
    fn score(&self, x: &Array2<f64>, y: &Array2<f64>, options: &ScoreOptions) -> Result<f64> {
        let y_pred = self.predict(x)?;
        r2_score(y, &y_pred, options)
    }

    /// Independent copy with the same configuration and no fitted state
    fn clone_unfitted(&self) -> Self
    where
        Self: Sized;

    /// Current configuration
    fn get_params(&self) -> Params;

    /// Change one configuration value.
    ///
    /// Unknown names fail with `UnrecognizedParameter`.
    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<()>;

    fn is_fitted(&self) -> bool;

    /// Short human-readable description
    fn name(&self) -> String {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("Estimator")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_conversions() {
        assert_eq!(ParamValue::from(3usize).as_usize(), Some(3));
        assert_eq!(ParamValue::Float(2.0).as_int(), Some(2));
        assert_eq!(ParamValue::Float(2.5).as_int(), None);
        assert_eq!(ParamValue::Int(-1).as_usize(), None);
        assert_eq!(ParamValue::from("distance").as_string(), Some("distance"));
        assert_eq!(ParamValue::from(true).as_bool(), Some(true));
        assert_eq!(ParamValue::Int(4).as_float(), Some(4.0));
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::Float(0.5).to_string(), "0.5");
        assert_eq!(ParamValue::from("uniform").to_string(), "\"uniform\"");
    }

    #[test]
    fn test_score_options_builder() {
        let options = ScoreOptions::new().with_multioutput(MultiOutput::VarianceWeighted);
        assert!(options.sample_weight.is_none());
        assert_eq!(options.multioutput, MultiOutput::VarianceWeighted);
    }
}
