//! Model error types.

use algorithm::TsError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Artifact could not be read or written
    #[error("Model artifact error at {path}: {reason}")]
    Artifact { path: String, reason: String },

    /// Sidecar metadata is malformed or inconsistent with the booster
    #[error("Invalid model metadata: {0}")]
    Metadata(String),

    /// Feature rows do not match the model's input width
    #[error("Expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("No training rows: {0}")]
    NoTrainingData(String),

    /// Failure inside the underlying algorithm
    #[error(transparent)]
    Algorithm(#[from] TsError),
}

pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ModelError::FeatureMismatch {
            expected: 17,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Expected 17 features, got 3");
    }

    #[test]
    fn test_from_ts_error() {
        let err: ModelError = TsError::NotFitted.into();
        assert_eq!(err, ModelError::Algorithm(TsError::NotFitted));
        assert_eq!(err.to_string(), TsError::NotFitted.to_string());
    }
}
