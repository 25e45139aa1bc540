//! Linear trend by ordinary least squares
//!
//! Fits `y = intercept + slope * t` where `t` is a zero-based sample index
//! (or any explicit abscissa via [`LinearTrend::fit_points`]).

use crate::{Predictor, Result, TsError};
use serde::{Deserialize, Serialize};

/// Linear trend model
///
/// # Example
///
/// ```rust
/// use algorithm::{LinearTrend, Predictor};
///
/// let data = vec![10.0, 12.0, 14.0, 16.0, 18.0, 20.0];
/// let mut model = LinearTrend::new();
/// model.fit(&data).unwrap();
///
/// let forecast = model.predict(3).unwrap();
/// assert!((forecast[0] - 22.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearTrend {
    intercept: f64,
    slope: f64,
    /// Index of the first step returned by `predict`
    next_index: f64,
    r_squared: f64,
    fitted: bool,
}

impl LinearTrend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trend per unit of `t`
    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient of determination of the fit
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Fit against explicit `(x, y)` pairs.
    ///
    /// Used when some samples of an indexed series were removed and the
    /// remaining ones must keep their original positions.
    pub fn fit_points(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(TsError::InvalidData(format!(
                "x has {} values but y has {}",
                x.len(),
                y.len()
            )));
        }
        if y.len() < 2 {
            return Err(TsError::InsufficientData {
                required: 2,
                actual: y.len(),
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(TsError::InvalidData(
                "Data contains NaN or infinite values".to_string(),
            ));
        }

        let n = y.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;

        let sxx: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
        let sxy: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
            .sum();

        if sxx.abs() < 1e-10 {
            return Err(TsError::NumericalError(
                "Singular design in regression".to_string(),
            ));
        }

        self.slope = sxy / sxx;
        self.intercept = mean_y - self.slope * mean_x;

        let ss_tot: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
        let ss_res: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(xi, yi)| (yi - (self.intercept + self.slope * xi)).powi(2))
            .sum();
        self.r_squared = if ss_tot > 1e-10 {
            1.0 - ss_res / ss_tot
        } else {
            1.0
        };

        self.next_index = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 1.0;
        self.fitted = true;
        Ok(())
    }

    /// Value of the fitted line at `t`
    pub fn predict_at(&self, t: f64) -> Result<f64> {
        if !self.fitted {
            return Err(TsError::NotFitted);
        }
        Ok(self.intercept + self.slope * t)
    }

    /// Values of the fitted line at `start, start + 1, ..` for `steps` points
    pub fn predict_from(&self, start: usize, steps: usize) -> Result<Vec<f64>> {
        (start..start + steps)
            .map(|t| self.predict_at(t as f64))
            .collect()
    }
}

impl Predictor for LinearTrend {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        let x: Vec<f64> = (0..data.len()).map(|i| i as f64).collect();
        self.fit_points(&x, data)
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(TsError::NotFitted);
        }
        Ok((0..steps)
            .map(|i| self.intercept + self.slope * (self.next_index + i as f64))
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}
