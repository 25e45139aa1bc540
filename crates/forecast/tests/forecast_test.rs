//! Pipeline tests through the public API

use algorithm::utils::ErrorMetrics;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use data::{DailySeries, Dataset, HistoricalRecord, Pollutant};
use forecast::{
    aqi_from_pm25, CityForecast, CityTrend, ComparatorConfig, DayOfWeekConfig,
    DayOfWeekForecaster, FamilyError, ForecastFamily, ModelComparator, NoJitter,
    PollutantTrendForecaster, TrendConfig, UniformJitter,
};
use model::RegressionModel;
use std::sync::atomic::{AtomicUsize, Ordering};

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

fn hourly(city: &str, hours: i64, pm25: impl Fn(i64) -> f64) -> Vec<HistoricalRecord> {
    (0..hours)
        .map(|h| {
            HistoricalRecord::new(start() + Duration::hours(h), city)
                .with_value(Pollutant::Pm25, pm25(h))
                .with_value(Pollutant::No2, 20.0)
        })
        .collect()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
}

// ============================================================================
// Day-of-Week Forecaster Tests
// ============================================================================

#[test]
fn test_day_of_week_shape_and_labels() {
    let dataset = Dataset::with_all_columns(hourly("Delhi", 24 * 21, |h| (h % 300) as f64));
    let forecaster = DayOfWeekForecaster::new(DayOfWeekConfig::default());
    let forecasts = forecaster.forecast_all(&dataset, today(), &mut NoJitter);

    let delhi = &forecasts["Delhi"];
    assert_eq!(delhi.days.len(), 7);
    // 2024-03-03 is a Sunday
    assert_eq!(delhi.days[0].date, "Mar 04");
    assert_eq!(delhi.days[0].day, "Mon");
    assert_eq!(delhi.days[6].day, "Sun");
}

#[test]
fn test_day_of_week_aqi_bounded() {
    let mut records = hourly("Delhi", 24 * 14, |h| (h * 37 % 900) as f64);
    records.extend(hourly("Pune", 24 * 14, |_| 2.0));
    let dataset = Dataset::with_all_columns(records);

    let forecaster = DayOfWeekForecaster::new(DayOfWeekConfig::default());
    let mut jitter = UniformJitter::seeded(3);
    let forecasts = forecaster.forecast_all(&dataset, today(), &mut jitter);

    for forecast in forecasts.values() {
        for day in &forecast.days {
            assert!((0.0..=500.0).contains(&day.aqi), "aqi {}", day.aqi);
        }
    }
}

#[test]
fn test_small_city_skipped() {
    let mut records = hourly("Delhi", 48, |_| 50.0);
    records.extend(hourly("Tiny", 9, |_| 50.0));
    let dataset = Dataset::with_all_columns(records);

    let forecasts = DayOfWeekForecaster::new(DayOfWeekConfig::default()).forecast_all(
        &dataset,
        today(),
        &mut NoJitter,
    );
    assert!(forecasts.contains_key("Delhi"));
    assert!(!forecasts.contains_key("Tiny"));
}

#[test]
fn test_missing_weekday_falls_back_to_all_rows() {
    // every record on a Monday; no Wednesday history
    let records: Vec<HistoricalRecord> = (0..20)
        .map(|i| {
            HistoricalRecord::new(start() + Duration::weeks(i), "Delhi")
                .with_value(Pollutant::Pm25, 45.0)
        })
        .collect();
    assert!(records.iter().all(|r| r.timestamp.weekday() == Weekday::Mon));
    let dataset = Dataset::with_all_columns(records);

    let forecast = DayOfWeekForecaster::new(DayOfWeekConfig::default())
        .forecast_all(&dataset, today(), &mut NoJitter)
        .remove("Delhi")
        .unwrap();

    let wednesday = forecast.days.iter().find(|d| d.day == "Wed").unwrap();
    assert!(wednesday.aqi.is_finite());
    assert!((wednesday.aqi - 75.0).abs() < 1e-9);
}

#[test]
fn test_absent_pm25_column_reads_zero() {
    let records: Vec<HistoricalRecord> = (0..30)
        .map(|h| {
            HistoricalRecord::new(start() + Duration::hours(h), "Agra")
                .with_value(Pollutant::No2, 30.0)
        })
        .collect();
    let dataset = Dataset::new(records, [Pollutant::No2], false);

    let forecast = DayOfWeekForecaster::new(DayOfWeekConfig::default())
        .forecast_all(&dataset, today(), &mut NoJitter)
        .remove("Agra")
        .unwrap();
    assert!(forecast.days.iter().all(|d| d.aqi == 0.0));
}

struct FixedModel {
    names: Vec<String>,
    seen_width: AtomicUsize,
    fail: bool,
}

impl RegressionModel for FixedModel {
    fn model_type(&self) -> &str {
        "Fixed"
    }

    fn predict(&self, rows: &[Vec<f64>]) -> model::Result<Vec<f64>> {
        self.seen_width.store(rows[0].len(), Ordering::SeqCst);
        if self.fail {
            return Err(model::ModelError::Metadata("boom".to_string()));
        }
        Ok(vec![612.0])
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.names)
    }
}

#[test]
fn test_model_features_filtered_and_clamped() {
    let dataset = Dataset::with_all_columns(hourly("Delhi", 48, |_| 10.0));
    let model = FixedModel {
        names: vec!["PM2.5".into(), "hour".into(), "unknown".into()],
        seen_width: AtomicUsize::new(0),
        fail: false,
    };
    let forecast = DayOfWeekForecaster::new(DayOfWeekConfig::default())
        .with_model(&model)
        .forecast_all(&dataset, today(), &mut NoJitter)
        .remove("Delhi")
        .unwrap();

    assert_eq!(model.seen_width.load(Ordering::SeqCst), 2);
    assert!(forecast.days.iter().all(|d| d.aqi == 500.0));
}

#[test]
fn test_failing_model_uses_breakpoints() {
    let dataset = Dataset::with_all_columns(hourly("Delhi", 48, |_| 75.0));
    let model = FixedModel {
        names: vec!["PM2.5".into()],
        seen_width: AtomicUsize::new(0),
        fail: true,
    };
    let forecast = DayOfWeekForecaster::new(DayOfWeekConfig::default())
        .with_model(&model)
        .forecast_all(&dataset, today(), &mut NoJitter)
        .remove("Delhi")
        .unwrap();

    let expected = aqi_from_pm25(75.0);
    assert!(forecast.days.iter().all(|d| (d.aqi - expected).abs() < 1e-9));
}

#[test]
fn test_city_forecast_round_trip() {
    let dataset = Dataset::with_all_columns(hourly("Delhi", 48, |h| h as f64));
    let forecasts = DayOfWeekForecaster::new(DayOfWeekConfig::default()).forecast_all(
        &dataset,
        today(),
        &mut UniformJitter::seeded(11),
    );

    let json = serde_json::to_string(&forecasts).unwrap();
    assert!(json.starts_with("{\"Delhi\":[{\"date\":"));
    let back: std::collections::BTreeMap<String, CityForecast> =
        serde_json::from_str(&json).unwrap();
    assert_eq!(back, forecasts);
}

// ============================================================================
// Pollutant Trend Forecaster Tests
// ============================================================================

#[test]
fn test_trend_skips_short_cities() {
    let mut records = hourly("Delhi", 150, |h| 30.0 + h as f64 * 0.1);
    records.extend(hourly("Tiny", 19, |_| 5.0));
    let dataset = Dataset::with_all_columns(records);

    let report = PollutantTrendForecaster::new(TrendConfig::default()).forecast_all(&dataset, start());
    assert_eq!(report.metadata.total_cities, 1);
    assert!(!report.forecasts.contains_key("Tiny"));

    let delhi = &report.forecasts["Delhi"];
    assert_eq!(delhi.trained_on, 100);
    assert_eq!(delhi.trends.len(), 7);
    assert_eq!(delhi.trends[0].day, "Mon");
    assert_eq!(delhi.trends[0].values.len(), 10);
    // window holds hours 50..150 so index 100 is hour 150
    assert!((delhi.trends[0].values["PM2.5"] - 45.0).abs() < 1e-6);
    assert_eq!(delhi.trends[0].values["NO2"], 20.0);
    assert_eq!(delhi.metadata.last_data_point, "2024-01-07 05:00:00");
}

#[test]
fn test_trend_flags_absent_columns() {
    let records = hourly("Delhi", 40, |_| 12.0);
    let dataset = Dataset::new(records, [Pollutant::Pm25, Pollutant::No2], false);

    let report = PollutantTrendForecaster::new(TrendConfig::default()).forecast_all(&dataset, start());
    let delhi = &report.forecasts["Delhi"];
    assert_eq!(delhi.missing_pollutants.len(), 8);
    assert!(delhi.missing_pollutants.contains(&Pollutant::O3));
    assert!(delhi.trends.iter().all(|d| d.values["O3"] == 0.0));
    assert!(delhi.trends.iter().all(|d| d.values.len() == 10));
}

#[test]
fn test_trend_report_json_shape() {
    let dataset = Dataset::with_all_columns(hourly("Delhi", 40, |_| 12.0));
    let report = PollutantTrendForecaster::new(TrendConfig::default()).forecast_all(&dataset, start());

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["metadata"]["model"], "Linear Regression");
    assert_eq!(value["metadata"]["trainingDataPoints"], 100);
    assert_eq!(value["metadata"]["generatedAt"], "2024-01-01 00:00:00");
    let day = &value["forecasts"]["Delhi"]["trends"][2];
    assert_eq!(day["day"], "Wed");
    assert_eq!(day["dayIndex"], 2);
    assert_eq!(day["PM2.5"], 12.0);

    let city: CityTrend =
        serde_json::from_value(value["forecasts"]["Delhi"].clone()).unwrap();
    assert_eq!(&city, &report.forecasts["Delhi"]);
}

// ============================================================================
// Comparator Tests
// ============================================================================

struct StubFamily {
    name: &'static str,
    rmse: Option<f64>,
}

impl ForecastFamily for StubFamily {
    fn name(&self) -> &str {
        self.name
    }

    fn slug(&self) -> &str {
        self.name
    }

    fn evaluate(&self, _series: &DailySeries, _ratio: f64) -> Result<ErrorMetrics, FamilyError> {
        self.rmse
            .map(|rmse| ErrorMetrics { rmse, mae: rmse / 2.0 })
            .ok_or(FamilyError::InvalidMetrics {
                family: self.name.to_string(),
            })
    }
}

fn daily_dataset(days: i64) -> Dataset {
    let records = (0..days)
        .map(|d| {
            HistoricalRecord::new(start() + Duration::days(d), "Delhi")
                .with_value(Pollutant::Co, 1.0 + (d % 5) as f64)
        })
        .collect();
    Dataset::new(records, [Pollutant::Co], false)
}

fn stub_comparator(rmses: [Option<f64>; 3]) -> ModelComparator {
    let names = ["A", "B", "C"];
    ModelComparator::with_families(
        ComparatorConfig {
            pollutants: vec![Pollutant::Co, Pollutant::O3],
            ..ComparatorConfig::default()
        },
        names
            .iter()
            .zip(rmses)
            .map(|(&name, rmse)| Box::new(StubFamily { name, rmse }) as Box<dyn ForecastFamily>)
            .collect(),
    )
}

#[test]
fn test_comparator_picks_minimum_rmse() {
    let report = stub_comparator([Some(3.0), Some(2.5), Some(4.0)]).run(&daily_dataset(120));

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.winners.len(), 1);
    assert_eq!(report.winners[0].model, "B");
    assert_eq!(report.winners[0].data_points, 120);
}

#[test]
fn test_comparator_excludes_failed_family() {
    let report = stub_comparator([Some(3.0), None, Some(4.0)]).run(&daily_dataset(120));
    assert_eq!(report.records.len(), 2);
    assert!(report.records.iter().all(|r| r.model != "B"));
    assert_eq!(report.winners[0].model, "A");
}

#[test]
fn test_comparator_skips_short_series() {
    let report = stub_comparator([Some(1.0), Some(1.0), Some(1.0)]).run(&daily_dataset(99));
    assert!(report.records.is_empty());
    assert!(report.winners.is_empty());
}

#[test]
fn test_standard_families_on_daily_series() {
    let records = (0..200)
        .map(|d| {
            let t = d as f64;
            HistoricalRecord::new(start() + Duration::days(d), "Delhi").with_value(
                Pollutant::O3,
                (30.0 + 0.05 * t) * (1.0 + 0.1 * (2.0 * std::f64::consts::PI * t / 7.0).sin()),
            )
        })
        .collect();
    let dataset = Dataset::new(records, [Pollutant::O3], false);
    let comparator = ModelComparator::new(ComparatorConfig {
        pollutants: vec![Pollutant::O3],
        ..ComparatorConfig::default()
    });

    let report = comparator.run(&dataset);
    let models: Vec<&str> = report.records.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(models, vec!["ARIMA", "SeasonalTrend", "GBDT"]);
    assert!(report.records.iter().all(|r| r.rmse.is_finite() && r.rmse >= 0.0));
    assert_eq!(report.winners.len(), 1);
}
