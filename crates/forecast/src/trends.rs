//! Per-pollutant linear trend forecaster.

use algorithm::utils::{impute_mean, observed_mean, round_to};
use algorithm::LinearTrend;
use chrono::NaiveDateTime;
use data::{Dataset, HistoricalRecord, Pollutant};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MODEL_NAME: &str = "Linear Regression";
const DESCRIPTION: &str = "Weekly pollutant concentration trends forecast";

#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    /// Most recent rows used per city
    pub window: usize,
    /// Cities with a smaller window are skipped
    pub min_rows: usize,
    pub horizon: usize,
    /// Series shorter than this forecast a flat mean
    pub min_fit_samples: usize,
    /// Fewer observed samples than this forecast a flat mean
    pub min_observed: usize,
    pub pollutants: Vec<Pollutant>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window: 100,
            min_rows: 20,
            horizon: 7,
            min_fit_samples: 10,
            min_observed: 5,
            pollutants: Pollutant::FORECAST_SET.to_vec(),
        }
    }
}

/// One forecast day: label, index and a value per configured pollutant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDay {
    pub day: String,
    pub day_index: usize,
    #[serde(flatten)]
    pub values: IndexMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMetadata {
    pub last_data_point: String,
    pub generated_at: String,
}

/// Trend forecast of one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityTrend {
    pub city: String,
    pub trained_on: usize,
    pub forecast_days: usize,
    pub pollutants: Vec<Pollutant>,
    pub missing_pollutants: Vec<Pollutant>,
    pub trends: Vec<TrendDay>,
    pub metadata: CityMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendMetadata {
    pub generated_at: String,
    pub total_cities: usize,
    pub pollutants: Vec<Pollutant>,
    pub forecast_days: usize,
    pub training_data_points: usize,
    pub model: String,
    pub description: String,
}

/// Full trend artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub metadata: TrendMetadata,
    pub forecasts: BTreeMap<String, CityTrend>,
}

/// Forecast `horizon` values of a series whose missing cells are `None`.
///
/// Missing cells take the mean of the present ones. Short or unobserved
/// series yield a flat line at their mean (0 with no observation); longer
/// ones are extrapolated by OLS on the sample index. Values are floored at 0.
pub fn forecast_series(values: &[Option<f64>], config: &TrendConfig) -> Vec<f64> {
    let filled = impute_mean(values);
    let mean = observed_mean(&filled).unwrap_or(0.0);
    let flat = || vec![mean.max(0.0); config.horizon];

    if filled.len() < config.min_fit_samples {
        return flat();
    }

    let (x, y): (Vec<f64>, Vec<f64>) = filled
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .unzip();
    if y.len() < config.min_observed {
        return flat();
    }

    let mut trend = LinearTrend::default();
    if trend.fit_points(&x, &y).is_err() {
        return flat();
    }
    match trend.predict_from(filled.len(), config.horizon) {
        Ok(forecast) => forecast.into_iter().map(|v| v.max(0.0)).collect(),
        Err(_) => flat(),
    }
}

pub struct PollutantTrendForecaster {
    config: TrendConfig,
}

impl PollutantTrendForecaster {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Forecast one city from its chronologically ordered rows. Returns
    /// `None` when the window holds fewer than `min_rows` rows.
    pub fn forecast_city(
        &self,
        dataset: &Dataset,
        city: &str,
        rows: &[&HistoricalRecord],
        generated_at: NaiveDateTime,
    ) -> Option<CityTrend> {
        let window = &rows[rows.len().saturating_sub(self.config.window)..];
        if window.len() < self.config.min_rows {
            return None;
        }
        let last = window.last()?;

        let mut missing = Vec::new();
        let mut series: Vec<(Pollutant, Vec<f64>)> = Vec::with_capacity(self.config.pollutants.len());
        for &p in &self.config.pollutants {
            if !dataset.has_column(p) {
                missing.push(p);
                series.push((p, vec![0.0; self.config.horizon]));
                continue;
            }
            let values: Vec<Option<f64>> = window.iter().map(|r| r.value(p)).collect();
            series.push((p, forecast_series(&values, &self.config)));
        }
        if !missing.is_empty() {
            debug!(city, ?missing, "Pollutant columns absent from dataset");
        }

        let trends = (0..self.config.horizon)
            .map(|i| TrendDay {
                day: DAY_LABELS[i % DAY_LABELS.len()].to_string(),
                day_index: i,
                values: series
                    .iter()
                    .map(|(p, forecast)| (p.column().to_string(), round_to(forecast[i], 2)))
                    .collect(),
            })
            .collect();

        Some(CityTrend {
            city: city.to_string(),
            trained_on: window.len(),
            forecast_days: self.config.horizon,
            pollutants: self.config.pollutants.clone(),
            missing_pollutants: missing,
            trends,
            metadata: CityMetadata {
                last_data_point: last.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            },
        })
    }

    /// Forecast every city with enough recent history.
    pub fn forecast_all(&self, dataset: &Dataset, generated_at: NaiveDateTime) -> TrendReport {
        let mut forecasts = BTreeMap::new();
        for (city, rows) in dataset.by_city() {
            match self.forecast_city(dataset, city, &rows, generated_at) {
                Some(trend) => {
                    forecasts.insert(city.to_string(), trend);
                }
                None => debug!(city, rows = rows.len(), "Skipping city with too little data"),
            }
        }
        info!(cities = forecasts.len(), "Generated pollutant trends");

        TrendReport {
            metadata: TrendMetadata {
                generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
                total_cities: forecasts.len(),
                pollutants: self.config.pollutants.clone(),
                forecast_days: self.config.horizon,
                training_data_points: self.config.window,
                model: MODEL_NAME.to_string(),
                description: DESCRIPTION.to_string(),
            },
            forecasts,
        }
    }
}
