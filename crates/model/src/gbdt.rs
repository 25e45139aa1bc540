//! Persisted gradient-boosted AQI regressor.
//!
//! The artifact is the booster file written by `gbdt` plus a JSON sidecar at
//! `<path>.meta.json` carrying what the booster format does not: feature
//! names, importances and hyperparameters.

use crate::error::{ModelError, Result};
use crate::{Hyperparameters, RegressionModel};
use algorithm::{BoostedTrees, BoostingParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MODEL_TYPE: &str = "GBDT";

/// Sidecar contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_type: String,
    pub feature_names: Vec<String>,
    pub feature_importances: Vec<f64>,
    pub hyperparameters: BoostingParams,
}

impl ModelMetadata {
    fn validate(&self) -> Result<()> {
        if self.feature_names.is_empty() {
            return Err(ModelError::Metadata("feature_names is empty".to_string()));
        }
        if !self.feature_importances.is_empty()
            && self.feature_importances.len() != self.feature_names.len()
        {
            return Err(ModelError::Metadata(format!(
                "{} importances for {} features",
                self.feature_importances.len(),
                self.feature_names.len()
            )));
        }
        Ok(())
    }
}

/// Location of the sidecar for a booster file
pub fn metadata_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.meta.json", path.to_string_lossy()))
}

fn artifact_error(path: &Path, reason: impl ToString) -> ModelError {
    ModelError::Artifact {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Boosted trees plus their declared schema.
#[derive(Debug)]
pub struct GbdtModel {
    trees: BoostedTrees,
    meta: ModelMetadata,
}

impl GbdtModel {
    /// Wrap a fitted booster.
    pub fn from_parts(
        trees: BoostedTrees,
        feature_names: Vec<String>,
        feature_importances: Vec<f64>,
    ) -> Result<Self> {
        if !trees.is_fitted() {
            return Err(algorithm::TsError::NotFitted.into());
        }
        let meta = ModelMetadata {
            model_type: MODEL_TYPE.to_string(),
            hyperparameters: *trees.params(),
            feature_names,
            feature_importances,
        };
        meta.validate()?;
        if meta.feature_names.len() != trees.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: trees.n_features(),
                actual: meta.feature_names.len(),
            });
        }
        Ok(Self { trees, meta })
    }

    /// Load the booster and its sidecar.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta_path = metadata_path(path);
        let raw = fs::read_to_string(&meta_path).map_err(|e| artifact_error(&meta_path, e))?;
        let meta: ModelMetadata =
            serde_json::from_str(&raw).map_err(|e| ModelError::Metadata(e.to_string()))?;
        meta.validate()?;

        let trees = BoostedTrees::load(path, meta.hyperparameters, meta.feature_names.len())?;
        info!(
            path = %path.display(),
            features = meta.feature_names.len(),
            "Loaded GBDT model"
        );
        Ok(Self { trees, meta })
    }

    /// Write the booster and its sidecar.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| artifact_error(parent, e))?;
        }
        self.trees.save(path)?;

        let meta_path = metadata_path(path);
        let json = serde_json::to_string_pretty(&self.meta)
            .map_err(|e| ModelError::Metadata(e.to_string()))?;
        fs::write(&meta_path, json).map_err(|e| artifact_error(&meta_path, e))?;
        info!(path = %path.display(), "Saved GBDT model");
        Ok(())
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.meta
    }
}

impl RegressionModel for GbdtModel {
    fn model_type(&self) -> &str {
        &self.meta.model_type
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let expected = self.meta.feature_names.len();
        if let Some(row) = rows.iter().find(|r| r.len() != expected) {
            return Err(ModelError::FeatureMismatch {
                expected,
                actual: row.len(),
            });
        }
        Ok(self.trees.predict(rows)?)
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.meta.feature_names)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        if self.meta.feature_importances.is_empty() {
            None
        } else {
            Some(&self.meta.feature_importances)
        }
    }

    fn hyperparameters(&self) -> Option<Hyperparameters> {
        let params = self.trees.params();
        Some(Hyperparameters {
            n_estimators: Some(params.n_estimators),
            max_depth: Some(params.max_depth),
            learning_rate: Some(params.learning_rate),
        })
    }
}
