//! Compare command - scores forecasting families per pollutant.

use anyhow::{Context, Result};
use forecast::{ComparatorConfig, ModelComparator};
use std::path::Path;
use tracing::info;

/// Runs the compare command.
pub fn run(input: &Path, out_dir: &Path) -> Result<()> {
    let dataset = super::load_dataset(input)?;

    let comparator = ModelComparator::new(ComparatorConfig::default());
    let report = comparator.run(&dataset);

    let written = forecast::output::write_comparison(out_dir, &report)
        .with_context(|| format!("Failed to write results to {}", out_dir.display()))?;

    for winner in &report.winners {
        println!("{:<10} {:<14} RMSE {:.4}", winner.pollutant, winner.model, winner.rmse);
    }
    info!(
        pollutants = report.winners.len(),
        files = written.len(),
        "Model comparison complete"
    );
    Ok(())
}
