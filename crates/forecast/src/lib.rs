//! Air-quality forecasting pipelines
//!
//! - [`day_of_week`]: 7-day AQI per city from same-weekday pollutant averages
//! - [`trends`]: 7-day per-pollutant linear extrapolation per city
//! - [`comparison`]: ARIMA / seasonal-trend / GBDT scoring per pollutant
//!
//! Every pipeline is a pure function of its inputs; artifacts are written
//! through [`output`].

pub mod aqi;
pub mod comparison;
pub mod day_of_week;
pub mod error;
pub mod jitter;
pub mod output;
pub mod trends;

pub use aqi::{aqi_from_pm25, clamp_aqi, AQI_MAX};
pub use comparison::{
    select_winner, ArimaFamily, ComparatorConfig, ComparisonReport, FamilyError, ForecastFamily,
    GbdtFamily, ModelComparisonRecord, ModelComparator, SeasonalTrendFamily,
};
pub use day_of_week::{CityForecast, DayForecast, DayOfWeekConfig, DayOfWeekForecaster};
pub use error::{ForecastError, Result};
pub use jitter::{Jitter, NoJitter, UniformJitter};
pub use trends::{
    CityTrend, PollutantTrendForecaster, TrendConfig, TrendDay, TrendMetadata, TrendReport,
};
