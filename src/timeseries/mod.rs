//! Time series estimation
//!
//! Provides the windowed wrapper and its supporting pieces:
//! - Wrapper configuration
//! - Sliding-window regressor over any [`Estimator`](crate::training::Estimator)
//! - Chronological train/test split

mod config;
mod regressor;
mod split;

pub use config::TimeSeriesConfig;
pub use regressor::{FittedModels, TimeSeriesRegressor};
pub use split::{split_frame, split_index, time_series_split, ChronologicalSplit, SplitOutput};
