//! Forecast accuracy metrics

use serde::{Deserialize, Serialize};

/// Mean Absolute Error (MAE)
///
/// Returns NaN when the inputs are empty or differ in length.
///
/// ```rust
/// use algorithm::utils::metrics::mae;
///
/// let actual = vec![1.0, 2.0, 3.0];
/// let predicted = vec![2.0, 2.0, 2.0];
/// assert!((mae(&actual, &predicted) - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    sum / actual.len() as f64
}

/// Mean Squared Error (MSE)
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    sum / actual.len() as f64
}

/// Root Mean Squared Error (RMSE)
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// R-squared (coefficient of determination)
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot < 1e-10 {
        return 1.0;
    }

    1.0 - ss_res / ss_tot
}

/// RMSE and MAE of one held-out evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub rmse: f64,
    pub mae: f64,
}

impl ErrorMetrics {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            rmse: rmse(actual, predicted),
            mae: mae(actual, predicted),
        }
    }

    /// Both metrics are finite numbers
    pub fn is_valid(&self) -> bool {
        self.rmse.is_finite() && self.mae.is_finite()
    }
}
