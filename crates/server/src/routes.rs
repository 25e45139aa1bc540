//! API route handlers

use crate::error::ServiceError;
use crate::service::{
    FeatureImportanceResponse, HealthResponse, ModelInfo, PredictRequest, PredictResponse,
    PredictionService,
};
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

pub type AppState = Arc<PredictionService>;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "AirAware ML Service is running" }))
}

pub async fn health(State(service): State<AppState>) -> Json<HealthResponse> {
    Json(service.health())
}

pub async fn model_info(State(service): State<AppState>) -> Result<Json<ModelInfo>, ServiceError> {
    service.model_info().map(Json)
}

pub async fn feature_importance(
    State(service): State<AppState>,
) -> Result<Json<FeatureImportanceResponse>, ServiceError> {
    service.feature_importance().map(Json)
}

pub async fn predict(
    State(service): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ServiceError> {
    let response = service.predict(&request);
    if let Err(e) = &response {
        tracing::warn!(error = %e, rows = request.data.len(), "Prediction request rejected");
    }
    response.map(Json)
}
