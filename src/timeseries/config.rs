//! Windowed estimator configuration

use crate::error::{Result, TimeSeriesError};
use crate::training::{ParamValue, Params};
use crate::windowing::WindowSpec;
use serde::{Deserialize, Serialize};

/// Configuration for [`TimeSeriesRegressor`](super::TimeSeriesRegressor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesConfig {
    /// Observations per window
    pub n_prev: usize,

    /// Steps past the window's end to predict (0 = last window row)
    pub n_ahead: usize,

    /// Fit one model per target column instead of one shared model
    pub parallel_models: bool,
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            n_prev: 3,
            n_ahead: 1,
            parallel_models: false,
        }
    }
}

impl TimeSeriesConfig {
    /// Parameter names owned by the wrapper rather than the wrapped estimator
    pub const PARAM_NAMES: [&'static str; 3] = ["n_prev", "n_ahead", "parallel_models"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_prev(mut self, n_prev: usize) -> Self {
        self.n_prev = n_prev;
        self
    }

    pub fn with_n_ahead(mut self, n_ahead: usize) -> Self {
        self.n_ahead = n_ahead;
        self
    }

    pub fn with_parallel_models(mut self, parallel_models: bool) -> Self {
        self.parallel_models = parallel_models;
        self
    }

    pub fn window(&self) -> WindowSpec {
        WindowSpec::new(self.n_prev, self.n_ahead)
    }

    pub fn validate(&self) -> Result<()> {
        self.window().validate()
    }

    pub fn recognizes(name: &str) -> bool {
        Self::PARAM_NAMES.contains(&name)
    }

    pub fn get_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("n_prev".to_string(), ParamValue::from(self.n_prev));
        params.insert("n_ahead".to_string(), ParamValue::from(self.n_ahead));
        params.insert("parallel_models".to_string(), ParamValue::Bool(self.parallel_models));
        params
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "n_prev" => {
                self.n_prev = value.as_usize().filter(|n| *n > 0).ok_or_else(|| {
                    TimeSeriesError::invalid_parameter(name, value, "expected a positive integer")
                })?;
            }
            "n_ahead" => {
                self.n_ahead = value.as_usize().ok_or_else(|| {
                    TimeSeriesError::invalid_parameter(name, value, "expected a non-negative integer")
                })?;
            }
            "parallel_models" => {
                self.parallel_models = value.as_bool().ok_or_else(|| {
                    TimeSeriesError::invalid_parameter(name, value, "expected a boolean")
                })?;
            }
            _ => return Err(TimeSeriesError::UnrecognizedParameter(name.to_string())),
        }
        Ok(())
    }
}
