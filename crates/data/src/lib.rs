//! Historical air-quality data
//!
//! Loads hourly city observations from CSV into an immutable [`Dataset`] and
//! derives the views the pipelines need: per-city record lists and the
//! all-city daily mean of a pollutant.

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod pollutant;
pub mod record;

pub use aggregate::{daily_mean, DailySeries};
pub use error::{DataError, Result};
pub use loader::{load_csv, parse_timestamp, read_csv};
pub use pollutant::Pollutant;
pub use record::{Dataset, HistoricalRecord, Readings};
