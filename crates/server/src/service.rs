//! Prediction service over tabular JSON rows.

use crate::error::ServiceError;
use chrono::{Datelike, Local, Timelike};
use indexmap::IndexMap;
use model::{GbdtModel, RegressionModel};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

const DATE_COLUMN: &str = "date";
const EXCLUDED_COLUMNS: [&str; 3] = [DATE_COLUMN, "location", "target"];
const SERVICE_NAME: &str = "ml_service";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictRequest {
    pub data: Vec<Map<String, Value>>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionIntervals {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<f64>,
    pub feature_count: usize,
    pub prediction_intervals: Option<PredictionIntervals>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub model_path: String,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_estimators: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_features: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportanceResponse {
    /// Sorted by descending score
    pub feature_importance: IndexMap<String, f64>,
    pub total_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub service: String,
}

/// Owns the model for the process lifetime
pub struct PredictionService {
    model: Option<Box<dyn RegressionModel>>,
    model_path: String,
}

impl PredictionService {
    /// Load the GBDT artifact at `path`; a failure leaves the service in
    /// degraded mode.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let model = match GbdtModel::load(path) {
            Ok(model) => {
                info!(path = %path.display(), "Model loaded successfully");
                Some(Box::new(model) as Box<dyn RegressionModel>)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Model not loaded");
                None
            }
        };
        Self {
            model,
            model_path: path.display().to_string(),
        }
    }

    pub fn with_model(model: Box<dyn RegressionModel>, model_path: impl Into<String>) -> Self {
        Self {
            model: Some(model),
            model_path: model_path.into(),
        }
    }

    pub fn without_model(model_path: impl Into<String>) -> Self {
        Self {
            model: None,
            model_path: model_path.into(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    fn model(&self) -> Result<&dyn RegressionModel, ServiceError> {
        self.model.as_deref().ok_or(ServiceError::ModelNotLoaded)
    }

    pub fn health(&self) -> HealthResponse {
        let loaded = self.is_loaded();
        HealthResponse {
            status: if loaded { "healthy" } else { "unhealthy" }.to_string(),
            model_loaded: loaded,
            service: SERVICE_NAME.to_string(),
        }
    }

    pub fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ServiceError> {
        if request.data.is_empty() {
            return Err(ServiceError::EmptyRequest);
        }
        let model = self.model()?;

        let table = build_table(&request.data)?;
        if table.is_empty() {
            return Err(ServiceError::NoFeatures);
        }

        let columns: Vec<String> = match (&request.features, model.feature_names()) {
            (Some(requested), _) => requested.clone(),
            (None, Some(declared)) => declared.to_vec(),
            (None, None) => table.keys().cloned().collect(),
        };
        if columns.is_empty() {
            return Err(ServiceError::NoFeatures);
        }
        let missing: Vec<&str> = columns
            .iter()
            .filter(|c| !table.contains_key(c.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::InvalidInput(format!(
                "Missing features: {}",
                missing.join(", ")
            )));
        }

        let rows: Vec<Vec<f64>> = (0..request.data.len())
            .map(|i| columns.iter().map(|c| table[c.as_str()][i]).collect())
            .collect();

        let predictions = model
            .predict(&rows)
            .map_err(|e| ServiceError::PredictionFailed(e.to_string()))?;

        let prediction_intervals = match model.prediction_intervals(&rows) {
            Some(Ok(bands)) => Some(PredictionIntervals {
                lower: bands.iter().map(|b| b.lower).collect(),
                upper: bands.iter().map(|b| b.upper).collect(),
            }),
            Some(Err(e)) => {
                warn!(error = %e, "Prediction intervals unavailable");
                None
            }
            None => None,
        };

        Ok(PredictResponse {
            predictions,
            feature_count: columns.len(),
            prediction_intervals,
            timestamp: Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        })
    }

    pub fn model_info(&self) -> Result<ModelInfo, ServiceError> {
        let model = self.model()?;
        let params = model.hyperparameters().unwrap_or_default();
        Ok(ModelInfo {
            model_type: model.model_type().to_string(),
            model_path: self.model_path.clone(),
            loaded: true,
            n_estimators: params.n_estimators,
            max_depth: params.max_depth,
            learning_rate: params.learning_rate,
            expected_features: model.feature_names().map(<[String]>::to_vec),
        })
    }

    pub fn feature_importance(&self) -> Result<FeatureImportanceResponse, ServiceError> {
        let model = self.model()?;
        let scores = model
            .feature_importances()
            .ok_or(ServiceError::Unsupported("feature importance"))?;

        let names: Vec<String> = match model.feature_names() {
            Some(names) if names.len() == scores.len() => names.to_vec(),
            _ => (0..scores.len()).map(|i| format!("feature_{}", i)).collect(),
        };
        let mut pairs: Vec<(String, f64)> = names.into_iter().zip(scores.iter().copied()).collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(FeatureImportanceResponse {
            total_features: pairs.len(),
            feature_importance: pairs.into_iter().collect(),
        })
    }
}

fn cell_value(column: &str, value: &Value) -> Result<Option<f64>, ServiceError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            ServiceError::InvalidInput(format!("Column '{}' has non-numeric value '{}'", column, s))
        }),
        other => Err(ServiceError::InvalidInput(format!(
            "Column '{}' has non-numeric value {}",
            column, other
        ))),
    }
}

/// Columnar view of the request rows, in first-appearance order, with
/// calendar columns derived from `date`, excluded columns dropped and gaps
/// filled with the column mean.
fn build_table(rows: &[Map<String, Value>]) -> Result<IndexMap<String, Vec<f64>>, ServiceError> {
    let n = rows.len();
    let mut raw: IndexMap<String, Vec<Option<f64>>> = IndexMap::new();

    for (i, row) in rows.iter().enumerate() {
        for (key, value) in row {
            if EXCLUDED_COLUMNS.contains(&key.as_str()) {
                continue;
            }
            let cell = cell_value(key, value)?;
            raw.entry(key.clone()).or_insert_with(|| vec![None; n])[i] = cell;
        }
    }

    let has_date = rows.iter().any(|r| r.contains_key(DATE_COLUMN));
    if has_date {
        let mut derived: [Vec<Option<f64>>; 5] = Default::default();
        for (i, row) in rows.iter().enumerate() {
            let Some(value) = row.get(DATE_COLUMN).filter(|v| !v.is_null()) else {
                derived.iter_mut().for_each(|col| col.push(None));
                continue;
            };
            let ts = value
                .as_str()
                .and_then(data::parse_timestamp)
                .ok_or_else(|| {
                    ServiceError::InvalidInput(format!("Row {} has an invalid date {}", i, value))
                })?;
            let parts = [
                f64::from(ts.year()),
                f64::from(ts.month()),
                f64::from(ts.day()),
                f64::from(ts.weekday().num_days_from_monday()),
                f64::from(ts.hour()),
            ];
            for (col, v) in derived.iter_mut().zip(parts) {
                col.push(Some(v));
            }
        }
        for (name, col) in ["year", "month", "day", "day_of_week", "hour"]
            .into_iter()
            .zip(derived)
        {
            raw.insert(name.to_string(), col);
        }
    }

    Ok(raw
        .into_iter()
        .map(|(name, col)| {
            let present: Vec<f64> = col.iter().flatten().copied().collect();
            let fill = if present.is_empty() {
                0.0
            } else {
                present.iter().sum::<f64>() / present.len() as f64
            };
            (name, col.into_iter().map(|v| v.unwrap_or(fill)).collect())
        })
        .collect())
}
