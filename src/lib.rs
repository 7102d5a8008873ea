//! Window Estimator - sliding-window regression for time series
//!
//! This crate adapts ordinary point-prediction estimators to sequential data:
//! every run of `n_prev` consecutive observations becomes one flattened
//! sample, labeled with the observation `n_ahead` steps later.
//!
//! # Modules
//!
//! ## Data
//! - [`sequence`] - Chronological sequences from arrays, slices and Polars
//! - [`windowing`] - Window construction, target alignment, flattening
//!
//! ## Estimation
//! - [`training`] - Estimator contract, linear and KNN regressors, metrics
//! - [`timeseries`] - Windowed regressor wrapper and chronological split
//!
//! # Example
//!
//! ```no_run
//! use window_estimator::prelude::*;
//! use ndarray::Array1;
//!
//! let series = Sequence::from(Array1::range(0.0, 50.0, 1.0));
//! let (train, test) = time_series_split(&series, 0.2, SplitOutput::default())?;
//!
//! let mut model = TimeSeriesRegressor::new(KNNRegressor::with_k(3), TimeSeriesConfig::default());
//! let predictions = model.fit(&train, None)?.predict(&test)?;
//! # Ok::<(), TimeSeriesError>(())
//! ```

// Core error handling
pub mod error;

// Data
pub mod sequence;
pub mod windowing;

// Estimation
pub mod training;
pub mod timeseries;

pub use error::{Result, TimeSeriesError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, TimeSeriesError};

    // Data
    pub use crate::sequence::{Layout, Sequence};
    pub use crate::windowing::{align_targets, flatten_windows, window_dataset, WindowSpec, WindowedDataset};

    // Estimators
    pub use crate::training::{
        Estimator, KNNRegressor, LinearRegression, MultiOutput, ParamValue, Params, RegressionMetrics, ScoreOptions,
    };

    // Time series
    pub use crate::timeseries::{
        time_series_split, ChronologicalSplit, FittedModels, SplitOutput, TimeSeriesConfig, TimeSeriesRegressor,
    };
}
