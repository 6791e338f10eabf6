//! Error types for the wine quality pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, WineError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum WineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Fit error: {0}")]
    FitError(String),

    #[error("Length mismatch: {left_name} has {left} entries, {right_name} has {right}")]
    LengthMismatch {
        left_name: &'static str,
        left: usize,
        right_name: &'static str,
        right: usize,
    },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for WineError {
    fn from(err: polars::error::PolarsError) -> Self {
        WineError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for WineError {
    fn from(err: serde_json::Error) -> Self {
        WineError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for WineError {
    fn from(err: ndarray::ShapeError) -> Self {
        WineError::SchemaError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WineError::SchemaError("expected 12 columns, got 11".to_string());
        assert_eq!(err.to_string(), "Schema error: expected 12 columns, got 11");
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = WineError::LengthMismatch {
            left_name: "y_true",
            left: 4,
            right_name: "y_pred",
            right: 3,
        };
        assert_eq!(err.to_string(), "Length mismatch: y_true has 4 entries, y_pred has 3");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WineError = io_err.into();
        assert!(matches!(err, WineError::IoError(_)));
    }
}
