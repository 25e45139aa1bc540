//! CSV loading.
//!
//! The header must carry `Datetime` and `City`; any subset of the pollutant
//! columns and an optional `AQI` column are accepted. Rows with a bad
//! timestamp or an empty city are skipped with a warning.

use crate::error::{DataError, Result};
use crate::pollutant::Pollutant;
use crate::record::{Dataset, HistoricalRecord};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

const DATETIME_COLUMN: &str = "Datetime";
const CITY_COLUMN: &str = "City";
const AQI_COLUMN: &str = "AQI";

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a timestamp in one of the accepted layouts; a bare date maps to
/// midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_cell(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Load a dataset from a CSV file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let dataset = read_csv(file)?;
    info!(
        path = %path.display(),
        records = dataset.len(),
        "Loaded historical dataset"
    );
    Ok(dataset)
}

/// Read a dataset from any CSV source.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let datetime_idx = position(DATETIME_COLUMN)
        .ok_or_else(|| DataError::MissingColumn(DATETIME_COLUMN.to_string()))?;
    let city_idx =
        position(CITY_COLUMN).ok_or_else(|| DataError::MissingColumn(CITY_COLUMN.to_string()))?;
    let aqi_idx = position(AQI_COLUMN);

    let columns: Vec<(Pollutant, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| Pollutant::from_column(h).map(|p| (p, i)))
        .collect();
    debug!(
        columns = ?columns.iter().map(|(p, _)| p.column()).collect::<Vec<_>>(),
        "Pollutant columns in header"
    );

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line, row) in rdr.records().enumerate() {
        let row = row?;
        let Some(timestamp) = row.get(datetime_idx).and_then(parse_timestamp) else {
            warn!(line = line + 2, "Skipping row with unparseable timestamp");
            skipped += 1;
            continue;
        };
        let city = row.get(city_idx).map(str::trim).unwrap_or_default();
        if city.is_empty() {
            warn!(line = line + 2, "Skipping row with empty city");
            skipped += 1;
            continue;
        }

        let mut record = HistoricalRecord::new(timestamp, city);
        for &(pollutant, idx) in &columns {
            record
                .readings
                .set(pollutant, row.get(idx).and_then(parse_cell));
        }
        record.aqi = aqi_idx.and_then(|i| row.get(i)).and_then(parse_cell);
        records.push(record);
    }

    if skipped > 0 {
        warn!(skipped, "Rows skipped while loading");
    }
    if records.is_empty() {
        return Err(DataError::NoData);
    }

    Ok(Dataset::new(
        records,
        columns.into_iter().map(|(p, _)| p),
        aqi_idx.is_some(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 3, 14)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap();
        assert_eq!(parse_timestamp("2020-03-14 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2020-03-14T09:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2020-03-14"),
            NaiveDate::from_ymd_opt(2020, 3, 14).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_timestamp("14/03/2020"), None);
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(" 12.5 "), Some(12.5));
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("nan"), None);
        assert_eq!(parse_cell("n/a"), None);
    }

    #[test]
    fn test_missing_city_column() {
        let csv = "Datetime,PM2.5\n2020-01-01 00:00:00,10\n";
        assert_eq!(
            read_csv(csv.as_bytes()).unwrap_err(),
            DataError::MissingColumn("City".to_string())
        );
    }

    #[test]
    fn test_all_rows_bad_is_no_data() {
        let csv = "City,Datetime,PM2.5\nDelhi,yesterday,10\n,2020-01-01,4\n";
        assert_eq!(read_csv(csv.as_bytes()).unwrap_err(), DataError::NoData);
    }
}
