//! Day-of-week conditioned AQI forecaster.
//!
//! For each future day the city's history is narrowed to rows sharing that
//! weekday, pollutant means are taken over the selection, PM2.5 is blended
//! with its most recent readings, and the resulting feature vector is scored
//! by the regression model or, without one, by the PM2.5 breakpoint table.

use crate::aqi::{aqi_from_pm25, clamp_aqi};
use crate::jitter::Jitter;
use algorithm::utils::{observed_mean, round_to};
use chrono::{Datelike, Days, NaiveDate};
use data::{Dataset, HistoricalRecord, Pollutant};
use model::{canonical_feature_names, RegressionModel, CALENDAR_FEATURES};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Tuning knobs of the day-of-week forecaster
#[derive(Debug, Clone, PartialEq)]
pub struct DayOfWeekConfig {
    /// Days forecast after `today`
    pub horizon: u32,
    /// Cities with fewer rows are skipped
    pub min_city_rows: usize,
    /// Below this many same-weekday rows the whole city history is used
    pub min_weekday_rows: usize,
    pub recent_rows: usize,
    /// Weight of the recent PM2.5 average in the blend
    pub recent_weight: f64,
    /// Hour of day fed to the model
    pub feature_hour: u32,
}

impl Default for DayOfWeekConfig {
    fn default() -> Self {
        Self {
            horizon: 7,
            min_city_rows: 10,
            min_weekday_rows: 5,
            recent_rows: 12,
            recent_weight: 0.7,
            feature_hour: 12,
        }
    }
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    /// `"%b %d"`, e.g. `"Mar 05"`
    pub date: String,
    /// `Mon`..`Sun`
    pub day: String,
    pub aqi: f64,
}

/// Ordered forecast days for one city
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityForecast {
    pub days: Vec<DayForecast>,
}

/// Forecaster with an optional pre-trained AQI model
pub struct DayOfWeekForecaster<'a> {
    config: DayOfWeekConfig,
    model: Option<&'a dyn RegressionModel>,
}

impl<'a> DayOfWeekForecaster<'a> {
    pub fn new(config: DayOfWeekConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    pub fn with_model(mut self, model: &'a dyn RegressionModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn config(&self) -> &DayOfWeekConfig {
        &self.config
    }

    /// Forecast every city with enough history, keyed by city name.
    pub fn forecast_all(
        &self,
        dataset: &Dataset,
        today: NaiveDate,
        jitter: &mut dyn Jitter,
    ) -> BTreeMap<String, CityForecast> {
        let mut forecasts = BTreeMap::new();
        for (city, rows) in dataset.by_city() {
            match self.forecast_city(dataset, &rows, today, jitter) {
                Some(forecast) => {
                    forecasts.insert(city.to_string(), forecast);
                }
                None => debug!(city, rows = rows.len(), "Skipping city with too little data"),
            }
        }
        info!(
            cities = forecasts.len(),
            model = self.model.is_some(),
            "Generated day-of-week forecasts"
        );
        forecasts
    }

    /// Forecast one city from its chronologically ordered rows. Returns
    /// `None` when the city has fewer than `min_city_rows` rows.
    pub fn forecast_city(
        &self,
        dataset: &Dataset,
        rows: &[&HistoricalRecord],
        today: NaiveDate,
        jitter: &mut dyn Jitter,
    ) -> Option<CityForecast> {
        if rows.len() < self.config.min_city_rows {
            return None;
        }

        let mut days = Vec::with_capacity(self.config.horizon as usize);
        for offset in 1..=self.config.horizon {
            let date = today.checked_add_days(Days::new(u64::from(offset)))?;
            let weekday = date.weekday().num_days_from_monday();

            let mut selection: Vec<&HistoricalRecord> = rows
                .iter()
                .copied()
                .filter(|r| r.weekday() == weekday)
                .collect();
            if selection.len() < self.config.min_weekday_rows {
                selection = rows.to_vec();
            }
            debug!(%date, weekday, samples = selection.len(), "Forecast day selection");

            let features = self.assemble_features(dataset, &selection, date);
            let aqi = self.score(&features, jitter);

            days.push(DayForecast {
                date: date.format("%b %d").to_string(),
                day: DAY_LABELS[weekday as usize].to_string(),
                aqi: round_to(aqi, 1),
            });
        }
        Some(CityForecast { days })
    }

    fn assemble_features(
        &self,
        dataset: &Dataset,
        selection: &[&HistoricalRecord],
        date: NaiveDate,
    ) -> HashMap<String, f64> {
        let column_mean = |rows: &[&HistoricalRecord], p: Pollutant| -> Option<f64> {
            if !dataset.has_column(p) {
                return None;
            }
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.value(p)).collect();
            observed_mean(&values)
        };

        let mut features = HashMap::with_capacity(CALENDAR_FEATURES.len() + Pollutant::ALL.len());
        let calendar = [
            f64::from(date.year()),
            f64::from(date.month()),
            f64::from(date.day()),
            f64::from(self.config.feature_hour),
            f64::from(date.weekday().num_days_from_monday()),
        ];
        for (name, value) in CALENDAR_FEATURES.iter().zip(calendar) {
            features.insert(name.to_string(), value);
        }
        for p in Pollutant::ALL {
            features.insert(
                p.column().to_string(),
                column_mean(selection, p).unwrap_or(0.0),
            );
        }

        // selection is chronological, so the tail holds the newest rows
        let recent = &selection[selection.len().saturating_sub(self.config.recent_rows)..];
        if let Some(recent_avg) = column_mean(recent, Pollutant::Pm25) {
            let selection_avg = features[Pollutant::Pm25.column()];
            let w = self.config.recent_weight;
            features.insert(
                Pollutant::Pm25.column().to_string(),
                w * recent_avg + (1.0 - w) * selection_avg,
            );
        }
        features
    }

    fn score(&self, features: &HashMap<String, f64>, jitter: &mut dyn Jitter) -> f64 {
        if let Some(model) = self.model {
            let names = model
                .feature_names()
                .map(<[String]>::to_vec)
                .unwrap_or_else(canonical_feature_names);
            let row: Vec<f64> = names.iter().filter_map(|n| features.get(n).copied()).collect();

            if row.is_empty() {
                warn!("No model features available, using breakpoint fallback");
            } else {
                match model.predict(&[row]) {
                    Ok(values) if !values.is_empty() => {
                        return clamp_aqi(jitter.apply(values[0]));
                    }
                    Ok(_) => warn!("Model returned no prediction, using breakpoint fallback"),
                    Err(e) => warn!(error = %e, "Model prediction failed, using breakpoint fallback"),
                }
            }
        }

        let pm25 = features
            .get(Pollutant::Pm25.column())
            .copied()
            .unwrap_or(0.0);
        clamp_aqi(jitter.apply(aqi_from_pm25(pm25)))
    }
}
