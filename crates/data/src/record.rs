//! Hourly observations and the loaded record set.

use crate::pollutant::Pollutant;
use chrono::{Datelike, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};

/// Pollutant readings of one observation, indexed by [`Pollutant::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Readings([Option<f64>; 12]);

impl Readings {
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        self.0[pollutant.index()]
    }

    pub fn set(&mut self, pollutant: Pollutant, value: Option<f64>) {
        self.0[pollutant.index()] = value.filter(|v| v.is_finite());
    }

    /// Present readings as (pollutant, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::ALL
            .into_iter()
            .filter_map(move |p| self.get(p).map(|v| (p, v)))
    }
}

/// One hourly observation for a city.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub timestamp: NaiveDateTime,
    pub city: String,
    pub readings: Readings,
    /// Observed AQI, when the source carries one
    pub aqi: Option<f64>,
}

impl HistoricalRecord {
    pub fn new(timestamp: NaiveDateTime, city: impl Into<String>) -> Self {
        Self {
            timestamp,
            city: city.into(),
            readings: Readings::default(),
            aqi: None,
        }
    }

    /// Builder used by loaders and fixtures.
    pub fn with_value(mut self, pollutant: Pollutant, value: f64) -> Self {
        self.readings.set(pollutant, Some(value));
        self
    }

    pub fn with_aqi(mut self, aqi: f64) -> Self {
        self.aqi = Some(aqi).filter(|v| v.is_finite());
        self
    }

    pub fn value(&self, pollutant: Pollutant) -> Option<f64> {
        self.readings.get(pollutant)
    }

    /// Weekday index, 0 = Monday .. 6 = Sunday
    pub fn weekday(&self) -> u32 {
        self.timestamp.weekday().num_days_from_monday()
    }
}

/// Immutable set of loaded records plus the pollutant columns present in the
/// source header.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<HistoricalRecord>,
    columns: BTreeSet<Pollutant>,
    has_aqi: bool,
}

impl Dataset {
    pub fn new(
        records: Vec<HistoricalRecord>,
        columns: impl IntoIterator<Item = Pollutant>,
        has_aqi: bool,
    ) -> Self {
        Self {
            records,
            columns: columns.into_iter().collect(),
            has_aqi,
        }
    }

    /// Dataset whose header carried every pollutant column.
    pub fn with_all_columns(records: Vec<HistoricalRecord>) -> Self {
        let has_aqi = records.iter().any(|r| r.aqi.is_some());
        Self::new(records, Pollutant::ALL, has_aqi)
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, pollutant: Pollutant) -> bool {
        self.columns.contains(&pollutant)
    }

    pub fn columns(&self) -> impl Iterator<Item = Pollutant> + '_ {
        self.columns.iter().copied()
    }

    pub fn has_aqi(&self) -> bool {
        self.has_aqi
    }

    /// Distinct city names, sorted.
    pub fn cities(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.city.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Records of one city in chronological order.
    pub fn city_records(&self, city: &str) -> Vec<&HistoricalRecord> {
        let mut rows: Vec<_> = self.records.iter().filter(|r| r.city == city).collect();
        rows.sort_by_key(|r| r.timestamp);
        rows
    }

    /// Records grouped by city, each group in chronological order.
    pub fn by_city(&self) -> BTreeMap<&str, Vec<&HistoricalRecord>> {
        let mut groups: BTreeMap<&str, Vec<&HistoricalRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.city.as_str()).or_default().push(record);
        }
        for rows in groups.values_mut() {
            rows.sort_by_key(|r| r.timestamp);
        }
        groups
    }
}
