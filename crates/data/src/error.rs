//! Data error types.

use thiserror::Error;

/// Errors raised while loading historical data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    /// The input file could not be opened or read
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    /// Malformed CSV
    #[error("CSV error: {0}")]
    Csv(String),

    /// A required column is missing from the header
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// No usable record in the input
    #[error("No records found in input")]
    NoData,
}

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let error = DataError::Io {
            path: "city_hour.csv".to_string(),
            reason: "No such file".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to read city_hour.csv: No such file");
    }

    #[test]
    fn test_missing_column_display() {
        let error = DataError::MissingColumn("City".to_string());
        assert_eq!(error.to_string(), "Missing required column 'City'");
    }

    #[test]
    fn test_no_data_display() {
        assert_eq!(DataError::NoData.to_string(), "No records found in input");
    }
}
