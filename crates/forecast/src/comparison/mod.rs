//! Multi-model comparison per pollutant.
//!
//! Each pollutant's all-city daily mean is split chronologically and every
//! configured [`ForecastFamily`] is fitted and scored on the held-out tail.
//! Families that fail are logged and left out; the minimum-RMSE survivor
//! wins.

mod family;

pub use family::{ArimaFamily, FamilyError, ForecastFamily, GbdtFamily, SeasonalTrendFamily};

use algorithm::utils::round_to;
use data::{daily_mean, Dataset, Pollutant};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const METRIC_DECIMALS: i32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ComparatorConfig {
    /// Share of the series used for training
    pub train_ratio: f64,
    /// Daily series shorter than this are skipped
    pub min_points: usize,
    pub pollutants: Vec<Pollutant>,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            min_points: 100,
            pollutants: Pollutant::FORECAST_SET.to_vec(),
        }
    }
}

/// Score of one family on one pollutant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparisonRecord {
    #[serde(rename = "Pollutant")]
    pub pollutant: Pollutant,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAE")]
    pub mae: f64,
    /// Length of the daily series
    #[serde(rename = "DataPoints")]
    pub data_points: usize,
}

/// First record with the smallest finite RMSE.
pub fn select_winner(records: &[ModelComparisonRecord]) -> Option<&ModelComparisonRecord> {
    records
        .iter()
        .filter(|r| r.rmse.is_finite())
        .fold(None, |best: Option<&ModelComparisonRecord>, r| match best {
            Some(b) if b.rmse <= r.rmse => Some(b),
            _ => Some(r),
        })
}

/// Family identity carried into the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyInfo {
    pub name: String,
    pub slug: String,
}

/// Outcome of a comparison run
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub families: Vec<FamilyInfo>,
    /// Valid records, grouped by pollutant in run order
    pub records: Vec<ModelComparisonRecord>,
    /// Winning record per compared pollutant
    pub winners: Vec<ModelComparisonRecord>,
}

impl ComparisonReport {
    /// Records of one family
    pub fn family_records<'a>(
        &'a self,
        family: &'a str,
    ) -> impl Iterator<Item = &'a ModelComparisonRecord> + 'a {
        self.records.iter().filter(move |r| r.model == family)
    }
}

/// Runs every family over every configured pollutant
pub struct ModelComparator {
    config: ComparatorConfig,
    families: Vec<Box<dyn ForecastFamily>>,
}

impl ModelComparator {
    /// Comparator with the ARIMA, seasonal-trend and GBDT families.
    pub fn new(config: ComparatorConfig) -> Self {
        Self::with_families(
            config,
            vec![
                Box::new(ArimaFamily::default()),
                Box::new(SeasonalTrendFamily::default()),
                Box::new(GbdtFamily::default()),
            ],
        )
    }

    pub fn with_families(config: ComparatorConfig, families: Vec<Box<dyn ForecastFamily>>) -> Self {
        Self { config, families }
    }

    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    /// Score every family on one daily series. Failed families are omitted.
    pub fn compare_series(&self, series: &data::DailySeries) -> Vec<ModelComparisonRecord> {
        let mut records = Vec::with_capacity(self.families.len());
        for family in &self.families {
            match family.evaluate(series, self.config.train_ratio) {
                Ok(metrics) => {
                    info!(
                        pollutant = %series.pollutant,
                        model = family.name(),
                        rmse = metrics.rmse,
                        mae = metrics.mae,
                        "Family scored"
                    );
                    records.push(ModelComparisonRecord {
                        pollutant: series.pollutant,
                        model: family.name().to_string(),
                        rmse: round_to(metrics.rmse, METRIC_DECIMALS),
                        mae: round_to(metrics.mae, METRIC_DECIMALS),
                        data_points: series.len(),
                    });
                }
                Err(e) => warn!(pollutant = %series.pollutant, error = %e, "Family failed"),
            }
        }
        records
    }

    /// Compare all configured pollutants of `dataset`.
    pub fn run(&self, dataset: &Dataset) -> ComparisonReport {
        let mut records = Vec::new();
        let mut winners = Vec::new();

        for &pollutant in &self.config.pollutants {
            let Some(series) = daily_mean(dataset, pollutant) else {
                warn!(%pollutant, "Pollutant column absent, skipping");
                continue;
            };
            if series.len() < self.config.min_points {
                warn!(
                    %pollutant,
                    points = series.len(),
                    required = self.config.min_points,
                    "Too few daily points, skipping"
                );
                continue;
            }

            let scored = self.compare_series(&series);
            if let Some(winner) = select_winner(&scored) {
                log_margin(winner, &scored);
                winners.push(winner.clone());
            } else {
                warn!(%pollutant, "No family produced a valid score");
            }
            records.extend(scored);
        }

        let report = ComparisonReport {
            families: self
                .families
                .iter()
                .map(|f| FamilyInfo {
                    name: f.name().to_string(),
                    slug: f.slug().to_string(),
                })
                .collect(),
            records,
            winners,
        };
        log_summary(&report);
        report
    }
}

fn log_margin(winner: &ModelComparisonRecord, scored: &[ModelComparisonRecord]) {
    let runner_up = scored
        .iter()
        .filter(|r| r.model != winner.model && r.rmse.is_finite())
        .map(|r| r.rmse)
        .min_by(f64::total_cmp);
    match runner_up {
        Some(second) if second > 0.0 => info!(
            pollutant = %winner.pollutant,
            winner = %winner.model,
            rmse = winner.rmse,
            improvement_pct = round_to((second - winner.rmse) / second * 100.0, 2),
            "Best model selected"
        ),
        _ => info!(
            pollutant = %winner.pollutant,
            winner = %winner.model,
            rmse = winner.rmse,
            "Best model selected"
        ),
    }
}

fn log_summary(report: &ComparisonReport) {
    for family in &report.families {
        let rmses: Vec<f64> = report.family_records(&family.name).map(|r| r.rmse).collect();
        if rmses.is_empty() {
            warn!(model = %family.name, "No successful evaluations");
            continue;
        }
        let wins = report.winners.iter().filter(|w| w.model == family.name).count();
        info!(
            model = %family.name,
            pollutants = rmses.len(),
            wins,
            mean_rmse = round_to(rmses.iter().sum::<f64>() / rmses.len() as f64, METRIC_DECIMALS),
            best_rmse = rmses.iter().copied().fold(f64::INFINITY, f64::min),
            worst_rmse = rmses.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            "Family summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(model: &str, rmse: f64) -> ModelComparisonRecord {
        ModelComparisonRecord {
            pollutant: Pollutant::Co,
            model: model.to_string(),
            rmse,
            mae: rmse / 2.0,
            data_points: 120,
        }
    }

    #[test]
    fn test_minimum_rmse_wins() {
        let records = vec![record("A", 3.0), record("B", 2.5), record("C", 4.0)];
        assert_eq!(select_winner(&records).map(|r| r.model.as_str()), Some("B"));
    }

    #[test]
    fn test_tie_keeps_first() {
        let records = vec![record("A", 2.0), record("B", 2.0)];
        assert_eq!(select_winner(&records).map(|r| r.model.as_str()), Some("A"));
    }

    #[test]
    fn test_non_finite_ignored() {
        let records = vec![record("A", f64::NAN), record("B", 7.0)];
        assert_eq!(select_winner(&records).map(|r| r.model.as_str()), Some("B"));
        assert!(select_winner(&[]).is_none());
    }
}
