//! Regression models consumed by the forecaster and the prediction service
//!
//! [`RegressionModel`] is the capability surface: every model predicts, and
//! may additionally declare its input schema, feature importances,
//! hyperparameters and prediction intervals. [`GbdtModel`] is the persisted
//! gradient-boosted AQI regressor.

pub mod error;
pub mod features;
pub mod gbdt;
pub mod training;

pub use error::{ModelError, Result};
pub use features::{calendar_features, canonical_feature_names, CALENDAR_FEATURES};
pub use gbdt::{metadata_path, GbdtModel, ModelMetadata};
pub use training::{permutation_importance, train_aqi_model, training_table, TrainingTable};

use serde::{Deserialize, Serialize};

/// Symmetric uncertainty band around a point prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Tree-ensemble hyperparameters a model may report
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub n_estimators: Option<usize>,
    pub max_depth: Option<u32>,
    pub learning_rate: Option<f64>,
}

/// A pre-trained tabular regressor.
///
/// Inference takes `&self`; implementations must be safe to share across
/// request handlers.
pub trait RegressionModel: Send + Sync {
    /// Short family name, e.g. `"GBDT"`
    fn model_type(&self) -> &str;

    /// Predict one value per feature row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Input column names in the order the model expects them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Importance score per input column, aligned with `feature_names`
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }

    fn hyperparameters(&self) -> Option<Hyperparameters> {
        None
    }

    /// Lower/upper bounds per row, for models that estimate quantiles
    fn prediction_intervals(&self, _rows: &[Vec<f64>]) -> Option<Result<Vec<PredictionInterval>>> {
        None
    }
}
