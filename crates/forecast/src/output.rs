//! Artifact writers.

use crate::comparison::{ComparisonReport, ModelComparisonRecord};
use crate::error::{ForecastError, Result};
use data::Pollutant;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DAY_OF_WEEK_FILE: &str = "precomputed-forecasts.json";
pub const TRENDS_FILE: &str = "precomputed-pollutant-trends.json";
pub const COMPARISON_FILE: &str = "model_comparison_pollutant_results.csv";
pub const BEST_MODEL_FILE: &str = "best_model_per_pollutant.csv";

#[derive(Serialize)]
struct FamilyResultRow {
    #[serde(rename = "Pollutant")]
    pollutant: Pollutant,
    #[serde(rename = "RMSE")]
    rmse: f64,
    #[serde(rename = "MAE")]
    mae: f64,
    #[serde(rename = "DataPoints")]
    data_points: usize,
}

#[derive(Serialize)]
struct BestModelRow<'a> {
    #[serde(rename = "Pollutant")]
    pollutant: Pollutant,
    #[serde(rename = "Model")]
    model: &'a str,
    #[serde(rename = "RMSE")]
    rmse: f64,
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| ForecastError::Io {
                path: parent.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Pretty-printed JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| ForecastError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "Wrote JSON artifact");
    Ok(())
}

/// CSV with a header derived from `T`. An empty slice yields an empty file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| ForecastError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), rows = rows.len(), "Wrote CSV artifact");
    Ok(())
}

/// Write the per-family, combined and best-model CSVs into `dir`.
pub fn write_comparison(dir: &Path, report: &ComparisonReport) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(report.families.len() + 2);

    for family in &report.families {
        let rows: Vec<FamilyResultRow> = report
            .family_records(&family.name)
            .map(|r| FamilyResultRow {
                pollutant: r.pollutant,
                rmse: r.rmse,
                mae: r.mae,
                data_points: r.data_points,
            })
            .collect();
        let path = dir.join(format!("{}_pollutant_results.csv", family.slug));
        write_csv(&path, &rows)?;
        written.push(path);
    }

    let path = dir.join(COMPARISON_FILE);
    write_csv::<ModelComparisonRecord>(&path, &report.records)?;
    written.push(path);

    let best: Vec<BestModelRow> = report
        .winners
        .iter()
        .map(|w| BestModelRow {
            pollutant: w.pollutant,
            model: &w.model,
            rmse: w.rmse,
        })
        .collect();
    let path = dir.join(BEST_MODEL_FILE);
    write_csv(&path, &best)?;
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::FamilyInfo;

    #[test]
    fn test_write_comparison_files() {
        let dir = tempfile::tempdir().unwrap();
        let record = ModelComparisonRecord {
            pollutant: Pollutant::Pm25,
            model: "ARIMA".to_string(),
            rmse: 1.2346,
            mae: 0.9,
            data_points: 400,
        };
        let report = ComparisonReport {
            families: vec![
                FamilyInfo {
                    name: "ARIMA".to_string(),
                    slug: "arima".to_string(),
                },
                FamilyInfo {
                    name: "GBDT".to_string(),
                    slug: "gbdt".to_string(),
                },
            ],
            records: vec![record.clone()],
            winners: vec![record],
        };

        let written = write_comparison(dir.path(), &report).unwrap();
        assert_eq!(written.len(), 4);

        let arima = fs::read_to_string(dir.path().join("arima_pollutant_results.csv")).unwrap();
        assert_eq!(arima, "Pollutant,RMSE,MAE,DataPoints\nPM2.5,1.2346,0.9,400\n");

        let combined = fs::read_to_string(dir.path().join(COMPARISON_FILE)).unwrap();
        assert!(combined.starts_with("Pollutant,Model,RMSE,MAE,DataPoints\n"));

        let best = fs::read_to_string(dir.path().join(BEST_MODEL_FILE)).unwrap();
        assert_eq!(best, "Pollutant,Model,RMSE\nPM2.5,ARIMA,1.2346\n");

        // no GBDT rows: empty file
        assert!(dir.path().join("gbdt_pollutant_results.csv").exists());
    }

    #[test]
    fn test_write_json_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(TRENDS_FILE);
        write_json(&path, &vec![1, 2, 3]).unwrap();
        let back: Vec<i32> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
