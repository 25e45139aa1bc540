//! Forecast error types

use thiserror::Error;

/// Errors raised while writing pipeline artifacts
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Filesystem failure
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for forecast operations
pub type Result<T> = std::result::Result<T, ForecastError>;
