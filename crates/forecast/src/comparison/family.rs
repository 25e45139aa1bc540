//! Forecasting families scored by the comparator.

use algorithm::utils::{chronological_split, lag_table, split_index, ErrorMetrics};
use algorithm::{Arima, BoostedTrees, BoostingParams, Predictor, SeasonalTrend, SeasonalityMode, TsError};
use data::DailySeries;
use thiserror::Error;

/// Failure of one family on one pollutant; never fatal to the run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FamilyError {
    #[error("{family}: need at least {required} rows, got {actual}")]
    InsufficientData {
        family: String,
        required: usize,
        actual: usize,
    },

    #[error("{family}: {source}")]
    Fit {
        family: String,
        #[source]
        source: TsError,
    },

    #[error("{family}: metrics are not finite")]
    InvalidMetrics { family: String },
}

/// A model family evaluated on a chronological train/test split.
pub trait ForecastFamily {
    /// Display name used in records, e.g. `"ARIMA"`
    fn name(&self) -> &str;

    /// File-name stem of the per-family artifact
    fn slug(&self) -> &str;

    /// Fit on the leading `train_ratio` share of `series` and score the
    /// held-out remainder.
    fn evaluate(&self, series: &DailySeries, train_ratio: f64) -> Result<ErrorMetrics, FamilyError>;
}

fn fit_error(family: &str) -> impl FnOnce(TsError) -> FamilyError + '_ {
    move |source| FamilyError::Fit {
        family: family.to_string(),
        source,
    }
}

fn score(family: &str, actual: &[f64], predicted: &[f64]) -> Result<ErrorMetrics, FamilyError> {
    let metrics = ErrorMetrics::compute(actual, predicted);
    if metrics.is_valid() {
        Ok(metrics)
    } else {
        Err(FamilyError::InvalidMetrics {
            family: family.to_string(),
        })
    }
}

fn require_test(family: &str, total: usize, split: usize) -> Result<(), FamilyError> {
    if split == 0 || split >= total {
        return Err(FamilyError::InsufficientData {
            family: family.to_string(),
            required: 2,
            actual: total,
        });
    }
    Ok(())
}

/// ARIMA(p, d, q), order (5, 1, 2) by default
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArimaFamily {
    pub order: (usize, usize, usize),
}

impl Default for ArimaFamily {
    fn default() -> Self {
        Self { order: (5, 1, 2) }
    }
}

impl ForecastFamily for ArimaFamily {
    fn name(&self) -> &str {
        "ARIMA"
    }

    fn slug(&self) -> &str {
        "arima"
    }

    fn evaluate(&self, series: &DailySeries, train_ratio: f64) -> Result<ErrorMetrics, FamilyError> {
        let values = series.values();
        let (train, test) = chronological_split(&values, train_ratio);
        require_test(self.name(), values.len(), train.len())?;

        let (p, d, q) = self.order;
        let mut model = Arima::new(p, d, q).map_err(fit_error(self.name()))?;
        model.fit(train).map_err(fit_error(self.name()))?;
        let forecast = model.predict(test.len()).map_err(fit_error(self.name()))?;
        score(self.name(), test, &forecast)
    }
}

/// Linear trend × Fourier seasonality over timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalTrendFamily {
    pub mode: SeasonalityMode,
}

impl Default for SeasonalTrendFamily {
    fn default() -> Self {
        Self {
            mode: SeasonalityMode::Multiplicative,
        }
    }
}

impl ForecastFamily for SeasonalTrendFamily {
    fn name(&self) -> &str {
        "SeasonalTrend"
    }

    fn slug(&self) -> &str {
        "seasonal_trend"
    }

    fn evaluate(&self, series: &DailySeries, train_ratio: f64) -> Result<ErrorMetrics, FamilyError> {
        let values = series.values();
        let timestamps = series.timestamps();
        let split = split_index(values.len(), train_ratio);
        require_test(self.name(), values.len(), split)?;

        let mut model = SeasonalTrend::with_standard_components(self.mode);
        model
            .fit_timestamps(&timestamps[..split], &values[..split])
            .map_err(fit_error(self.name()))?;

        // forecast consecutive days after the training window
        let test = &values[split..];
        let future = model.future_dates(test.len()).map_err(fit_error(self.name()))?;
        let forecast = model
            .predict_timestamps(&future)
            .map_err(fit_error(self.name()))?;
        score(self.name(), test, &forecast)
    }
}

/// Boosted trees over a lag table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbdtFamily {
    pub n_lags: usize,
    /// Fewer lag rows than this is a failure
    pub min_rows: usize,
    pub params: BoostingParams,
}

impl Default for GbdtFamily {
    fn default() -> Self {
        Self {
            n_lags: 30,
            min_rows: 50,
            params: BoostingParams::default(),
        }
    }
}

impl ForecastFamily for GbdtFamily {
    fn name(&self) -> &str {
        "GBDT"
    }

    fn slug(&self) -> &str {
        "gbdt"
    }

    fn evaluate(&self, series: &DailySeries, train_ratio: f64) -> Result<ErrorMetrics, FamilyError> {
        let (rows, targets) = lag_table(&series.values(), self.n_lags);
        if rows.len() < self.min_rows {
            return Err(FamilyError::InsufficientData {
                family: self.name().to_string(),
                required: self.min_rows,
                actual: rows.len(),
            });
        }
        let split = split_index(rows.len(), train_ratio);
        require_test(self.name(), rows.len(), split)?;

        let mut trees = BoostedTrees::new(self.params).map_err(fit_error(self.name()))?;
        trees
            .fit(&rows[..split], &targets[..split])
            .map_err(fit_error(self.name()))?;
        let forecast = trees.predict(&rows[split..]).map_err(fit_error(self.name()))?;
        score(self.name(), &targets[split..], &forecast)
    }
}
