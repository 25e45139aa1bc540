//! Trends command - per-pollutant linear trends per city.

use anyhow::{Context, Result};
use chrono::Local;
use forecast::{PollutantTrendForecaster, TrendConfig};
use std::path::Path;
use tracing::info;

/// Runs the trends command.
pub fn run(input: &Path, output: &Path, window: usize) -> Result<()> {
    let dataset = super::load_dataset(input)?;

    let forecaster = PollutantTrendForecaster::new(TrendConfig {
        window,
        ..TrendConfig::default()
    });
    let report = forecaster.forecast_all(&dataset, Local::now().naive_local());

    forecast::output::write_json(output, &report)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        cities = report.metadata.total_cities,
        output = %output.display(),
        "Pollutant trends complete"
    );
    Ok(())
}
