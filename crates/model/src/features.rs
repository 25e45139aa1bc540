//! Canonical AQI feature layout.

use chrono::{Datelike, NaiveDateTime, Timelike};
use data::Pollutant;

/// Calendar columns, in canonical order
pub const CALENDAR_FEATURES: [&str; 5] = ["year", "month", "day", "hour", "day_of_week"];

/// The calendar columns followed by every pollutant column.
pub fn canonical_feature_names() -> Vec<String> {
    CALENDAR_FEATURES
        .iter()
        .map(|s| s.to_string())
        .chain(Pollutant::ALL.iter().map(|p| p.column().to_string()))
        .collect()
}

/// `[year, month, day, hour, day_of_week]` with Monday = 0
pub fn calendar_features(timestamp: NaiveDateTime) -> [f64; 5] {
    [
        f64::from(timestamp.year()),
        f64::from(timestamp.month()),
        f64::from(timestamp.day()),
        f64::from(timestamp.hour()),
        f64::from(timestamp.weekday().num_days_from_monday()),
    ]
}
