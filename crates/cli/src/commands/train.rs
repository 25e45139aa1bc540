//! Train command - fits the GBDT AQI model.

use algorithm::BoostingParams;
use anyhow::{Context, Result};
use model::RegressionModel;
use std::path::Path;
use tracing::info;

/// Runs the train command.
pub fn run(input: &Path, output: &Path, params: BoostingParams, seed: u64) -> Result<()> {
    let dataset = super::load_dataset(input)?;
    if !dataset.has_aqi() {
        anyhow::bail!("{} has no AQI column to train on", input.display());
    }

    info!(?params, seed, "Training AQI model");
    let model = model::train_aqi_model(&dataset, params, seed).context("Training failed")?;
    model
        .save(output)
        .with_context(|| format!("Failed to save model to {}", output.display()))?;

    if let (Some(names), Some(scores)) = (model.feature_names(), model.feature_importances()) {
        let mut ranked: Vec<_> = names.iter().zip(scores).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(a.1));
        for (name, score) in ranked.iter().take(5) {
            info!(feature = %name, importance = **score, "Top feature");
        }
    }
    info!(output = %output.display(), "Model saved");
    Ok(())
}
