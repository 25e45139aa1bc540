//! Service errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error("No data provided for prediction")]
    EmptyRequest,

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("No valid features found for prediction")]
    NoFeatures,

    /// Malformed rows or feature selection
    #[error("{0}")]
    InvalidInput(String),

    #[error("Model does not support {0}")]
    Unsupported(&'static str),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::EmptyRequest | ServiceError::NoFeatures | ServiceError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
            ServiceError::PredictionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ServiceError::Unsupported("feature importance").to_string(),
            "Model does not support feature importance"
        );
        assert_eq!(
            ServiceError::PredictionFailed("width".to_string()).to_string(),
            "Prediction failed: width"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::EmptyRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::ModelNotLoaded.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ServiceError::Unsupported("x").status(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            ServiceError::PredictionFailed(String::new()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
