//! Fitting the AQI regressor from historical records.

use crate::error::{ModelError, Result};
use crate::features::{calendar_features, canonical_feature_names};
use crate::gbdt::GbdtModel;
use algorithm::utils::{observed_mean, rmse};
use algorithm::{BoostedTrees, BoostingParams};
use data::{Dataset, Pollutant};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

/// Dense feature table in canonical column order
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingTable {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

/// Build training rows from every record with an observed AQI and PM2.5.
///
/// Missing pollutant cells are filled with that column's mean over the
/// selected rows, 0 when the column has no values.
pub fn training_table(dataset: &Dataset) -> Result<TrainingTable> {
    let selected: Vec<_> = dataset
        .records()
        .iter()
        .filter(|r| r.aqi.is_some() && r.value(Pollutant::Pm25).is_some())
        .collect();
    if selected.is_empty() {
        return Err(ModelError::NoTrainingData(
            "no rows with both AQI and PM2.5".to_string(),
        ));
    }

    let fill: Vec<f64> = Pollutant::ALL
        .iter()
        .map(|&p| {
            let column: Vec<Option<f64>> = selected.iter().map(|r| r.value(p)).collect();
            observed_mean(&column).unwrap_or(0.0)
        })
        .collect();

    let mut rows = Vec::with_capacity(selected.len());
    let mut targets = Vec::with_capacity(selected.len());
    for record in selected {
        let mut row = calendar_features(record.timestamp).to_vec();
        row.extend(
            Pollutant::ALL
                .iter()
                .map(|&p| record.value(p).unwrap_or(fill[p.index()])),
        );
        rows.push(row);
        targets.extend(record.aqi);
    }

    Ok(TrainingTable {
        feature_names: canonical_feature_names(),
        rows,
        targets,
    })
}

/// RMSE increase per column when that column is shuffled, normalized to sum
/// to 1. Uniform when no column matters.
pub fn permutation_importance(
    trees: &BoostedTrees,
    rows: &[Vec<f64>],
    targets: &[f64],
    seed: u64,
) -> Result<Vec<f64>> {
    let width = trees.n_features();
    let baseline = rmse(targets, &trees.predict(rows)?);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut scores = Vec::with_capacity(width);
    for col in 0..width {
        let mut column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
        column.shuffle(&mut rng);
        let shuffled: Vec<Vec<f64>> = rows
            .iter()
            .zip(column)
            .map(|(row, v)| {
                let mut row = row.clone();
                row[col] = v;
                row
            })
            .collect();
        let score = rmse(targets, &trees.predict(&shuffled)?) - baseline;
        scores.push(if score.is_finite() { score.max(0.0) } else { 0.0 });
    }

    let total: f64 = scores.iter().sum();
    if total > 0.0 {
        Ok(scores.into_iter().map(|s| s / total).collect())
    } else {
        Ok(vec![1.0 / width.max(1) as f64; width])
    }
}

/// Fit the GBDT AQI regressor on the whole dataset.
pub fn train_aqi_model(dataset: &Dataset, params: BoostingParams, seed: u64) -> Result<GbdtModel> {
    let table = training_table(dataset)?;
    info!(
        rows = table.rows.len(),
        features = table.feature_names.len(),
        "Training GBDT AQI model"
    );

    let mut trees = BoostedTrees::new(params)?;
    trees.fit(&table.rows, &table.targets)?;

    let importances = permutation_importance(&trees, &table.rows, &table.targets, seed)?;
    debug!(?importances, "Permutation importances");

    GbdtModel::from_parts(trees, table.feature_names, importances)
}
