//! # server
//!
//! REST API over a persisted AQI regression model. One model is loaded at
//! startup and shared read-only by every handler; when loading fails the
//! service stays up in degraded mode and reports "Model not loaded".

pub mod config;
pub mod error;
pub mod routes;
pub mod service;

pub use config::{ConfigError, ServerConfig};
pub use error::ServiceError;
pub use service::{
    FeatureImportanceResponse, HealthResponse, ModelInfo, PredictRequest, PredictResponse,
    PredictionIntervals, PredictionService,
};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application router with CORS and request tracing.
pub fn router(service: Arc<PredictionService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/model/info", get(routes::model_info))
        .route("/model/feature-importance", get(routes::feature_importance))
        .route("/predict", post(routes::predict))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}
