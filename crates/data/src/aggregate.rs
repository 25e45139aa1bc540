//! All-city daily aggregation.

use crate::pollutant::Pollutant;
use crate::record::Dataset;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

/// Chronological daily mean of one pollutant across every city.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub pollutant: Pollutant,
    pub points: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|&(_, v)| v).collect()
    }

    /// Point dates at midnight.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.points
            .iter()
            .map(|(d, _)| d.and_time(NaiveTime::default()))
            .collect()
    }
}

/// Mean of `pollutant` per calendar date over all cities. Dates with no
/// reading are omitted. Returns `None` when the column is absent.
pub fn daily_mean(dataset: &Dataset, pollutant: Pollutant) -> Option<DailySeries> {
    if !dataset.has_column(pollutant) {
        return None;
    }

    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in dataset.records() {
        if let Some(value) = record.value(pollutant) {
            let entry = buckets.entry(record.timestamp.date()).or_default();
            entry.0 += value;
            entry.1 += 1;
        }
    }

    Some(DailySeries {
        pollutant,
        points: buckets
            .into_iter()
            .map(|(date, (sum, count))| (date, sum / count as f64))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HistoricalRecord;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_mean_across_cities_and_hours() {
        let dataset = Dataset::with_all_columns(vec![
            HistoricalRecord::new(at(2, 5), "Delhi").with_value(Pollutant::O3, 30.0),
            HistoricalRecord::new(at(1, 0), "Delhi").with_value(Pollutant::O3, 10.0),
            HistoricalRecord::new(at(1, 12), "Pune").with_value(Pollutant::O3, 20.0),
            HistoricalRecord::new(at(3, 0), "Pune"),
        ]);
        let series = daily_mean(&dataset, Pollutant::O3).unwrap();
        assert_eq!(series.values(), vec![15.0, 30.0]);
        assert_eq!(series.points[0].0, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(series.timestamps()[1], at(2, 0));
    }

    #[test]
    fn test_absent_column() {
        let dataset = Dataset::new(Vec::new(), [Pollutant::Pm25], false);
        assert!(daily_mean(&dataset, Pollutant::Co).is_none());
        assert!(daily_mean(&dataset, Pollutant::Pm25).unwrap().is_empty());
    }
}
