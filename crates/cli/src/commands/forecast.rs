//! Forecast command - day-of-week AQI forecasts per city.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use forecast::{DayOfWeekConfig, DayOfWeekForecaster, Jitter, NoJitter, UniformJitter};
use model::{GbdtModel, RegressionModel};
use std::path::Path;
use tracing::{info, warn};

/// Runs the forecast command.
pub fn run(
    input: &Path,
    output: &Path,
    model_path: Option<&Path>,
    seed: Option<u64>,
    no_jitter: bool,
    today: Option<NaiveDate>,
) -> Result<()> {
    let dataset = super::load_dataset(input)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let model = model_path.and_then(|path| match GbdtModel::load(path) {
        Ok(model) => Some(model),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Model unavailable, using breakpoint table");
            None
        }
    });

    let mut jitter: Box<dyn Jitter> = match (no_jitter, seed) {
        (true, _) => Box::new(NoJitter),
        (false, Some(seed)) => Box::new(UniformJitter::seeded(seed)),
        (false, None) => Box::new(UniformJitter::from_entropy()),
    };

    let mut forecaster = DayOfWeekForecaster::new(DayOfWeekConfig::default());
    if let Some(model) = &model {
        forecaster = forecaster.with_model(model as &dyn RegressionModel);
    }

    info!(%today, cities = dataset.cities().len(), "Generating day-of-week forecasts");
    let forecasts = forecaster.forecast_all(&dataset, today, jitter.as_mut());

    forecast::output::write_json(output, &forecasts)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        cities = forecasts.len(),
        output = %output.display(),
        "Forecast generation complete"
    );
    Ok(())
}
