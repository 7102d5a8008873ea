//! Error types for windowed time series estimation

use thiserror::Error;

/// Result type alias for time series estimator operations
pub type Result<T> = std::result::Result<T, TimeSeriesError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum TimeSeriesError {
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Model not fitted")]
    NotFitted,

    #[error("Unrecognized parameter: {0}")]
    UnrecognizedParameter(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl TimeSeriesError {
    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        TimeSeriesError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for TimeSeriesError {
    fn from(err: polars::error::PolarsError) -> Self {
        TimeSeriesError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for TimeSeriesError {
    fn from(err: serde_json::Error) -> Self {
        TimeSeriesError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for TimeSeriesError {
    fn from(err: ndarray::ShapeError) -> Self {
        TimeSeriesError::ShapeMismatch {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimeSeriesError::InsufficientData {
            required: 5,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data: need at least 5 observations, got 3"
        );
        assert_eq!(TimeSeriesError::NotFitted.to_string(), "Model not fitted");
    }

    #[test]
    fn test_error_from_shape() {
        let shape_err = ndarray::Array2::<f64>::from_shape_vec((2, 2), vec![1.0]).unwrap_err();
        let err: TimeSeriesError = shape_err.into();
        assert!(matches!(err, TimeSeriesError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let err = TimeSeriesError::invalid_parameter("n_prev", 0, "must be at least 1");
        assert_eq!(err.to_string(), "Invalid parameter: n_prev = 0, must be at least 1");
    }
}
