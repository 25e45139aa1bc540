//! Trend × seasonality model over timestamped observations
//!
//! A linear trend is fitted first; the remaining signal (ratio to trend in
//! multiplicative mode, difference in additive mode) is regressed on Fourier
//! terms of each configured seasonal period:
//!
//! ```text
//! multiplicative: y(t) = trend(t) * (1 + s(t))
//! additive:       y(t) = trend(t) + s(t)
//! s(t) = Σ_c Σ_k a_ck sin(2πk t / P_c) + b_ck cos(2πk t / P_c)
//! ```
//!
//! Time is measured in days since the first observation.

mod fourier;

use crate::regression::LinearTrend;
use crate::{Predictor, Result, TsError};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub use fourier::{fourier_features, ridge_solve};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// How seasonal terms combine with the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonalityMode {
    Additive,
    Multiplicative,
}

/// One seasonal period expanded into `fourier_order` sine/cosine pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalComponent {
    pub name: String,
    /// Period in days
    pub period: f64,
    pub fourier_order: usize,
}

impl SeasonalComponent {
    pub fn new(name: &str, period: f64, fourier_order: usize) -> Self {
        Self {
            name: name.to_string(),
            period,
            fourier_order,
        }
    }

    pub fn daily() -> Self {
        Self::new("daily", 1.0, 4)
    }

    pub fn weekly() -> Self {
        Self::new("weekly", 7.0, 3)
    }

    pub fn yearly() -> Self {
        Self::new("yearly", 365.25, 10)
    }
}

/// Seasonal trend forecaster
///
/// # Example
///
/// ```rust
/// use algorithm::{SeasonalComponent, SeasonalTrend, SeasonalityMode};
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let ts: Vec<_> = (0..60).map(|i| start + Duration::days(i)).collect();
/// let y: Vec<f64> = (0..60).map(|i| 30.0 + i as f64 * 0.2).collect();
///
/// let mut model = SeasonalTrend::new(SeasonalityMode::Multiplicative)
///     .with_component(SeasonalComponent::weekly());
/// model.fit_timestamps(&ts, &y).unwrap();
/// let future = model.future_dates(5).unwrap();
/// assert_eq!(model.predict_timestamps(&future).unwrap().len(), 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalTrend {
    components: Vec<SeasonalComponent>,
    mode: SeasonalityMode,
    ridge: f64,
    origin: Option<NaiveDateTime>,
    last: Option<NaiveDateTime>,
    trend: LinearTrend,
    beta: Vec<f64>,
}

impl SeasonalTrend {
    pub fn new(mode: SeasonalityMode) -> Self {
        Self {
            components: Vec::new(),
            mode,
            ridge: 1e-3,
            origin: None,
            last: None,
            trend: LinearTrend::new(),
            beta: Vec::new(),
        }
    }

    /// Daily, weekly and yearly seasonality in the given mode
    pub fn with_standard_components(mode: SeasonalityMode) -> Self {
        Self::new(mode)
            .with_component(SeasonalComponent::daily())
            .with_component(SeasonalComponent::weekly())
            .with_component(SeasonalComponent::yearly())
    }

    pub fn with_component(mut self, component: SeasonalComponent) -> Self {
        self.components.push(component);
        self
    }

    /// L2 penalty on the seasonal coefficients
    pub fn with_ridge(mut self, ridge: f64) -> Self {
        self.ridge = ridge.max(0.0);
        self
    }

    pub fn mode(&self) -> SeasonalityMode {
        self.mode
    }

    pub fn components(&self) -> &[SeasonalComponent] {
        &self.components
    }

    fn days_since_origin(&self, origin: NaiveDateTime, ts: &[NaiveDateTime]) -> Vec<f64> {
        ts.iter()
            .map(|t| (*t - origin).num_seconds() as f64 / SECONDS_PER_DAY)
            .collect()
    }

    /// Fit on `(timestamp, value)` pairs
    pub fn fit_timestamps(&mut self, ts: &[NaiveDateTime], y: &[f64]) -> Result<()> {
        if ts.len() != y.len() {
            return Err(TsError::InvalidData(format!(
                "{} timestamps for {} values",
                ts.len(),
                y.len()
            )));
        }
        if y.len() < 3 {
            return Err(TsError::InsufficientData {
                required: 3,
                actual: y.len(),
            });
        }
        for c in &self.components {
            if c.period <= 0.0 {
                return Err(TsError::invalid_parameter(
                    "period",
                    format!("seasonality '{}' needs a positive period", c.name),
                ));
            }
        }

        let origin = *ts.iter().min().ok_or(TsError::InsufficientData {
            required: 3,
            actual: 0,
        })?;
        let last = *ts.iter().max().unwrap_or(&origin);
        let t = self.days_since_origin(origin, ts);

        let mut trend = LinearTrend::new();
        trend.fit_points(&t, y)?;
        let trend_values: Vec<f64> = t
            .iter()
            .map(|ti| trend.predict_at(*ti))
            .collect::<Result<_>>()?;

        let remainder: Vec<f64> = match self.mode {
            SeasonalityMode::Additive => y
                .iter()
                .zip(trend_values.iter())
                .map(|(yi, tr)| yi - tr)
                .collect(),
            SeasonalityMode::Multiplicative => {
                if trend_values.iter().any(|tr| tr.abs() < 1e-8) {
                    return Err(TsError::NumericalError(
                        "trend reaches zero; multiplicative seasonality is undefined".to_string(),
                    ));
                }
                y.iter()
                    .zip(trend_values.iter())
                    .map(|(yi, tr)| yi / tr - 1.0)
                    .collect()
            }
        };

        let design = fourier_features(&t, &self.components);
        let beta = ridge_solve(&design, &remainder, self.ridge)?;

        self.origin = Some(origin);
        self.last = Some(last);
        self.trend = trend;
        self.beta = beta;
        Ok(())
    }

    /// Predict at arbitrary timestamps
    pub fn predict_timestamps(&self, ts: &[NaiveDateTime]) -> Result<Vec<f64>> {
        let origin = self.origin.ok_or(TsError::NotFitted)?;
        let t = self.days_since_origin(origin, ts);
        let design = fourier_features(&t, &self.components);

        t.iter()
            .zip(design.iter())
            .map(|(ti, row)| {
                let trend = self.trend.predict_at(*ti)?;
                let seasonal: f64 = row.iter().zip(self.beta.iter()).map(|(x, b)| x * b).sum();
                Ok(match self.mode {
                    SeasonalityMode::Additive => trend + seasonal,
                    SeasonalityMode::Multiplicative => trend * (1.0 + seasonal),
                })
            })
            .collect()
    }

    /// `periods` consecutive daily timestamps after the last fitted one
    pub fn future_dates(&self, periods: usize) -> Result<Vec<NaiveDateTime>> {
        let last = self.last.ok_or(TsError::NotFitted)?;
        Ok((1..=periods as i64).map(|d| last + Duration::days(d)).collect())
    }
}

impl Predictor for SeasonalTrend {
    /// Treat `data` as consecutive daily observations
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        let origin = NaiveDateTime::default();
        let ts: Vec<NaiveDateTime> = (0..data.len() as i64)
            .map(|d| origin + Duration::days(d))
            .collect();
        self.fit_timestamps(&ts, data)
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        let future = self.future_dates(steps)?;
        self.predict_timestamps(&future)
    }

    fn is_fitted(&self) -> bool {
        self.origin.is_some()
    }
}
