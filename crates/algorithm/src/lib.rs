//! Forecasting algorithms used by the air-quality pipelines
//!
//! The crate is organized by model family:
//!
//! - [`regression`]: ARIMA and ordinary-least-squares linear trend
//! - [`seasonal`]: trend × Fourier seasonality model over timestamped series
//! - [`ml`]: gradient boosted regression trees
//! - [`utils`]: metrics, preprocessing, chronological splits
//!
//! ## Example
//!
//! ```rust
//! use algorithm::prelude::*;
//!
//! let data: Vec<f64> = (1..=40).map(|x| x as f64).collect();
//! let mut model = Arima::new(1, 1, 0).unwrap();
//! model.fit(&data).unwrap();
//! let forecast = model.predict(3).unwrap();
//! assert_eq!(forecast.len(), 3);
//! ```

mod error;
pub mod ml;
pub mod regression;
pub mod seasonal;
pub mod utils;

pub use error::{Result, TsError};

pub use ml::*;
pub use regression::*;
pub use seasonal::*;

/// Common trait for univariate series forecasters
pub trait Predictor {
    /// Fit the model to historical data
    fn fit(&mut self, data: &[f64]) -> Result<()>;

    /// Predict the next `steps` values after the fitted data
    fn predict(&self, steps: usize) -> Result<Vec<f64>>;

    /// Check if the model has been fitted
    fn is_fitted(&self) -> bool;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ml::{BoostedTrees, BoostingParams};
    pub use crate::regression::{Arima, LinearTrend};
    pub use crate::seasonal::{SeasonalComponent, SeasonalTrend, SeasonalityMode};
    pub use crate::Predictor;
    pub use crate::{Result, TsError};
}
