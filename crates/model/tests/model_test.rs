//! Training and artifact round trip through the public API

use algorithm::BoostingParams;
use chrono::NaiveDate;
use data::{Dataset, HistoricalRecord, Pollutant};
use model::{canonical_feature_names, train_aqi_model, GbdtModel, RegressionModel};

fn dataset() -> Dataset {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let records = (0..120)
        .map(|i| {
            let pm25 = 20.0 + (i % 40) as f64 * 3.0;
            HistoricalRecord::new(start + chrono::Duration::hours(i * 6), "Delhi")
                .with_value(Pollutant::Pm25, pm25)
                .with_value(Pollutant::No2, 15.0 + (i % 7) as f64)
                .with_aqi(pm25 * 2.0)
        })
        .collect();
    Dataset::with_all_columns(records)
}

fn params() -> BoostingParams {
    BoostingParams {
        n_estimators: 40,
        max_depth: 4,
        learning_rate: 0.2,
    }
}

#[test]
fn test_trained_model_declares_canonical_schema() {
    let model = train_aqi_model(&dataset(), params(), 42).unwrap();

    assert_eq!(model.model_type(), "GBDT");
    assert_eq!(model.feature_names().unwrap(), canonical_feature_names().as_slice());

    let importances = model.feature_importances().unwrap();
    assert_eq!(importances.len(), 17);
    assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);

    let pm25 = 5 + Pollutant::Pm25.index();
    let top = importances
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(top, pm25);
}

#[test]
fn test_trained_model_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("best_model_gbdt.model");

    let model = train_aqi_model(&dataset(), params(), 1).unwrap();
    model.save(&path).unwrap();
    let loaded = GbdtModel::load(&path).unwrap();

    let mut row = vec![2020.0, 1.0, 5.0, 12.0, 6.0];
    row.extend(std::iter::repeat(0.0).take(12));
    row[5] = 80.0;

    let a = model.predict(&[row.clone()]).unwrap()[0];
    let b = loaded.predict(&[row]).unwrap()[0];
    assert!((a - b).abs() < 1e-3);
    assert!(a > 100.0 && a < 220.0);
    assert_eq!(loaded.hyperparameters().unwrap().n_estimators, Some(40));
}
