//! Estimators and scoring
//!
//! Defines the [`Estimator`] contract that windowed wrappers delegate to,
//! along with:
//! - Regression metrics (R², MSE, MAE)
//! - Linear models (OLS and ridge, multi-output)
//! - K-Nearest Neighbors regression

mod models;
pub mod metrics;
pub mod linear_models;
pub mod knn;

pub use models::{Estimator, MultiOutput, ParamValue, Params, ScoreOptions};
pub use metrics::{mean_absolute_error, mean_squared_error, r2_score, RegressionMetrics};
pub use linear_models::LinearRegression;
pub use knn::{DistanceMetric, KNNConfig, KNNRegressor, WeightScheme};
