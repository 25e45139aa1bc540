//! Gradient boosted regression trees backed by the `gbdt` crate
//!
//! Rows are dense `f64` feature vectors; they are narrowed to the booster's
//! value type at the boundary.

use crate::{Result, TsError};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Hyperparameters of the booster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    /// Number of boosting rounds
    pub n_estimators: usize,
    pub max_depth: u32,
    pub learning_rate: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 6,
            learning_rate: 0.1,
        }
    }
}

impl BoostingParams {
    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(TsError::invalid_parameter(
                "n_estimators",
                "must be at least 1",
            ));
        }
        if self.max_depth == 0 {
            return Err(TsError::invalid_parameter("max_depth", "must be at least 1"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(TsError::invalid_parameter(
                "learning_rate",
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }

    fn to_config(self, feature_size: usize) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(feature_size);
        cfg.set_max_depth(self.max_depth);
        cfg.set_iterations(self.n_estimators);
        cfg.set_shrinkage(self.learning_rate as ValueType);
        cfg.set_loss("SquaredError");
        cfg.set_debug(false);
        cfg
    }
}

/// Gradient boosted trees regressor
pub struct BoostedTrees {
    params: BoostingParams,
    n_features: usize,
    booster: Option<GBDT>,
}

impl fmt::Debug for BoostedTrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoostedTrees")
            .field("params", &self.params)
            .field("n_features", &self.n_features)
            .field("fitted", &self.booster.is_some())
            .finish()
    }
}

fn check_rows(rows: &[Vec<f64>], width: Option<usize>) -> Result<usize> {
    let width = match width {
        Some(w) => w,
        None => rows
            .first()
            .map(Vec::len)
            .ok_or(TsError::InsufficientData {
                required: 1,
                actual: 0,
            })?,
    };
    if width == 0 {
        return Err(TsError::InvalidData("rows have no features".to_string()));
    }
    if let Some(bad) = rows.iter().position(|r| r.len() != width) {
        return Err(TsError::InvalidData(format!(
            "row {} has {} features, expected {}",
            bad,
            rows[bad].len(),
            width
        )));
    }
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(TsError::InvalidData(
            "features contain NaN or infinite values".to_string(),
        ));
    }
    Ok(width)
}

fn narrow(row: &[f64]) -> Vec<ValueType> {
    row.iter().map(|v| *v as ValueType).collect()
}

impl BoostedTrees {
    pub fn new(params: BoostingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            n_features: 0,
            booster: None,
        })
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    /// Number of input columns the fitted booster expects
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        self.booster.is_some()
    }

    /// Fit on a dense feature table and its targets
    pub fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        if rows.len() != targets.len() {
            return Err(TsError::InvalidData(format!(
                "{} rows for {} targets",
                rows.len(),
                targets.len()
            )));
        }
        let width = check_rows(rows, None)?;
        if targets.iter().any(|t| !t.is_finite()) {
            return Err(TsError::InvalidData(
                "targets contain NaN or infinite values".to_string(),
            ));
        }

        let mut training: DataVec = rows
            .iter()
            .zip(targets.iter())
            .map(|(row, y)| Data::new_training_data(narrow(row), 1.0, *y as ValueType, None))
            .collect();

        let mut booster = GBDT::new(&self.params.to_config(width));
        booster.fit(&mut training);

        self.n_features = width;
        self.booster = Some(booster);
        Ok(())
    }

    /// Predict one value per row
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let booster = self.booster.as_ref().ok_or(TsError::NotFitted)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        check_rows(rows, Some(self.n_features))?;

        let test: DataVec = rows
            .iter()
            .map(|row| Data::new_test_data(narrow(row), None))
            .collect();
        Ok(booster.predict(&test).into_iter().map(f64::from).collect())
    }

    /// Write the booster in the `gbdt` model format
    pub fn save(&self, path: &Path) -> Result<()> {
        let booster = self.booster.as_ref().ok_or(TsError::NotFitted)?;
        booster
            .save_model(&path.to_string_lossy())
            .map_err(|e| TsError::Persistence(format!("{}: {}", path.display(), e)))
    }

    /// Load a booster written by [`BoostedTrees::save`].
    ///
    /// The feature count and hyperparameters are not part of the booster
    /// file and must be supplied by the caller.
    pub fn load(path: &Path, params: BoostingParams, n_features: usize) -> Result<Self> {
        let booster = GBDT::load_model(&path.to_string_lossy())
            .map_err(|e| TsError::Persistence(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            params,
            n_features,
            booster: Some(booster),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_table() -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let targets = rows
            .iter()
            .map(|r| if r[0] < 100.0 { 10.0 } else { 50.0 })
            .collect();
        (rows, targets)
    }

    #[test]
    fn test_rejects_bad_params() {
        let params = BoostingParams {
            learning_rate: 0.0,
            ..BoostingParams::default()
        };
        assert!(BoostedTrees::new(params).is_err());
    }

    #[test]
    fn test_learns_step_function() {
        let (rows, targets) = step_table();
        let mut model = BoostedTrees::new(BoostingParams::default()).unwrap();
        model.fit(&rows, &targets).unwrap();

        let preds = model.predict(&[vec![20.0, 3.0], vec![180.0, 5.0]]).unwrap();
        assert!((preds[0] - 10.0).abs() < 2.0, "got {}", preds[0]);
        assert!((preds[1] - 50.0).abs() < 2.0, "got {}", preds[1]);
    }

    #[test]
    fn test_predict_checks_width() {
        let (rows, targets) = step_table();
        let mut model = BoostedTrees::new(BoostingParams::default()).unwrap();
        model.fit(&rows, &targets).unwrap();
        assert!(matches!(
            model.predict(&[vec![1.0]]),
            Err(TsError::InvalidData(_))
        ));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = BoostedTrees::new(BoostingParams::default()).unwrap();
        assert!(matches!(
            model.predict(&[vec![1.0, 2.0]]),
            Err(TsError::NotFitted)
        ));
    }

    #[test]
    fn test_save_and_load() {
        let (rows, targets) = step_table();
        let mut model = BoostedTrees::new(BoostingParams::default()).unwrap();
        model.fit(&rows, &targets).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("step.model");
        model.save(&path).unwrap();

        let loaded = BoostedTrees::load(&path, BoostingParams::default(), 2).unwrap();
        let probe = vec![vec![150.0, 1.0]];
        let a = model.predict(&probe).unwrap();
        let b = loaded.predict(&probe).unwrap();
        assert!((a[0] - b[0]).abs() < 1e-4);
    }
}
