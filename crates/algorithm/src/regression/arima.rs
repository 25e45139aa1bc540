//! ARIMA (AutoRegressive Integrated Moving Average)
//!
//! The series is differenced `d` times, AR coefficients are estimated from
//! the sample autocovariances with the Levinson-Durbin recursion, and MA
//! coefficients from the lagged autocorrelation of the AR residuals.
//! Forecasts are produced on the differenced scale and integrated back.
//!
//! ```rust
//! use algorithm::{Arima, Predictor};
//!
//! let data: Vec<f64> = (0..60).map(|i| 40.0 + i as f64 * 0.5 + (i as f64).sin()).collect();
//! let mut model = Arima::new(5, 1, 2).unwrap();
//! model.fit(&data).unwrap();
//! assert_eq!(model.predict(12).unwrap().len(), 12);
//! ```

use crate::utils::preprocessing::{difference, mean};
use crate::{Predictor, Result, TsError};
use serde::{Deserialize, Serialize};

const MAX_AR_ORDER: usize = 10;
const MAX_DIFFERENCING: usize = 2;
const MAX_MA_ORDER: usize = 10;
const EPSILON: f64 = 1e-10;

/// ARIMA(p, d, q) forecaster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arima {
    p: usize,
    d: usize,
    q: usize,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// Mean of the differenced series
    level: f64,
    /// Last `d` values of each differencing stage, innermost last
    anchors: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    fitted: bool,
}

impl Arima {
    /// Create an unfitted model with orders p (0-10), d (0-2) and q (0-10)
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > MAX_AR_ORDER {
            return Err(TsError::invalid_parameter("p", "AR order must be <= 10"));
        }
        if d > MAX_DIFFERENCING {
            return Err(TsError::invalid_parameter(
                "d",
                "Differencing order must be <= 2",
            ));
        }
        if q > MAX_MA_ORDER {
            return Err(TsError::invalid_parameter("q", "MA order must be <= 10"));
        }

        Ok(Self {
            p,
            d,
            q,
            ar: vec![0.0; p],
            ma: vec![0.0; q],
            level: 0.0,
            anchors: Vec::new(),
            differenced: Vec::new(),
            residuals: Vec::new(),
            fitted: false,
        })
    }

    /// Model orders as (p, d, q)
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Minimum series length accepted by [`Predictor::fit`]
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 10
    }

    /// Integrate forecasts on the differenced scale back to the original scale.
    ///
    /// `anchors[k]` is the last value of the series after `k` differences.
    fn integrate(&self, mut values: Vec<f64>) -> Vec<f64> {
        for stage in (0..self.d).rev() {
            let mut last = self.anchors[stage];
            for v in values.iter_mut() {
                last += *v;
                *v = last;
            }
        }
        values
    }
}

/// Sample autocovariances of a centered series for lags 0..=max_lag
fn autocovariances(centered: &[f64], max_lag: usize) -> Vec<f64> {
    let n = centered.len() as f64;
    (0..=max_lag)
        .map(|k| {
            centered
                .iter()
                .skip(k)
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n
        })
        .collect()
}

/// Solve the Yule-Walker equations with the Levinson-Durbin recursion
fn yule_walker(gamma: &[f64], order: usize) -> Vec<f64> {
    let mut phi = vec![0.0; order];
    if order == 0 || gamma[0].abs() < EPSILON {
        return phi;
    }

    let mut error = gamma[0];
    for k in 0..order {
        let mut acc = gamma[k + 1];
        for j in 0..k {
            acc -= phi[j] * gamma[k - j];
        }
        if error.abs() < EPSILON {
            break;
        }
        let reflection = acc / error;

        let previous = phi.clone();
        phi[k] = reflection;
        for j in 0..k {
            phi[j] = previous[j] - reflection * previous[k - 1 - j];
        }
        error *= 1.0 - reflection * reflection;
    }
    phi
}

impl Predictor for Arima {
    fn fit(&mut self, data: &[f64]) -> Result<()> {
        let required = self.min_observations();
        if data.len() < required {
            return Err(TsError::InsufficientData {
                required,
                actual: data.len(),
            });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(TsError::InvalidData(
                "Data contains NaN or infinite values".to_string(),
            ));
        }

        let mut stage = data.to_vec();
        let mut anchors = Vec::with_capacity(self.d);
        for _ in 0..self.d {
            anchors.push(stage[stage.len() - 1]);
            stage = difference(&stage, 1);
        }

        let level = mean(&stage);
        let centered: Vec<f64> = stage.iter().map(|x| x - level).collect();
        let gamma = autocovariances(&centered, self.p);
        let ar = yule_walker(&gamma, self.p);

        let mut residuals = vec![0.0; centered.len()];
        for t in self.p..centered.len() {
            let fitted: f64 = (0..self.p).map(|j| ar[j] * centered[t - j - 1]).sum();
            residuals[t] = centered[t] - fitted;
        }

        let mut ma = vec![0.0; self.q];
        if self.q > 0 {
            let resid_mean = mean(&residuals);
            let resid_centered: Vec<f64> = residuals.iter().map(|r| r - resid_mean).collect();
            let rho = autocovariances(&resid_centered, self.q);
            if rho[0].abs() > EPSILON {
                for k in 0..self.q {
                    ma[k] = (rho[k + 1] / rho[0]).clamp(-0.99, 0.99);
                }
            }
        }

        self.ar = ar;
        self.ma = ma;
        self.level = level;
        self.anchors = anchors;
        self.differenced = stage;
        self.residuals = residuals;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(TsError::NotFitted);
        }
        if steps == 0 {
            return Ok(Vec::new());
        }

        let mut history: Vec<f64> = self.differenced.iter().map(|x| x - self.level).collect();
        let mut shocks = self.residuals.clone();
        let mut forecasts = Vec::with_capacity(steps);

        for _ in 0..steps {
            let n = history.len();
            let ar_part: f64 = (0..self.p).map(|j| self.ar[j] * history[n - j - 1]).sum();
            let ma_part: f64 = (0..self.q)
                .filter(|j| *j < shocks.len())
                .map(|j| self.ma[j] * shocks[shocks.len() - j - 1])
                .sum();
            let next = ar_part + ma_part;

            history.push(next);
            shocks.push(0.0);
            forecasts.push(next + self.level);
        }

        Ok(self.integrate(forecasts))
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_validation() {
        assert!(Arima::new(5, 1, 2).is_ok());
        assert!(Arima::new(11, 0, 0).is_err());
        assert!(Arima::new(1, 3, 0).is_err());
        assert!(Arima::new(1, 0, 11).is_err());
    }

    #[test]
    fn test_insufficient_data() {
        let mut model = Arima::new(5, 1, 2).unwrap();
        let result = model.fit(&[1.0; 10]);
        assert_eq!(
            result,
            Err(TsError::InsufficientData {
                required: 18,
                actual: 10
            })
        );
    }

    #[test]
    fn test_predict_before_fit() {
        let model = Arima::new(1, 1, 0).unwrap();
        assert_eq!(model.predict(3), Err(TsError::NotFitted));
    }

    #[test]
    fn test_linear_series_continues_trend() {
        let data: Vec<f64> = (0..50).map(|i| 10.0 + 2.0 * i as f64).collect();
        let mut model = Arima::new(1, 1, 0).unwrap();
        model.fit(&data).unwrap();

        let forecast = model.predict(3).unwrap();
        assert!((forecast[0] - 110.0).abs() < 1e-6);
        assert!((forecast[2] - 114.0).abs() < 1e-6);
    }

    #[test]
    fn test_ar1_coefficient_recovered() {
        let mut state: u64 = 42;
        let mut data = vec![1.0];
        for i in 1..400 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let noise = (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5;
            data.push(0.6 * data[i - 1] + noise);
        }
        let mut model = Arima::new(1, 0, 0).unwrap();
        model.fit(&data).unwrap();
        assert!((model.ar_coefficients()[0] - 0.6).abs() < 0.15);
    }

    #[test]
    fn test_rejects_nan() {
        let mut data: Vec<f64> = (0..30).map(|i| i as f64).collect();
        data[4] = f64::NAN;
        let mut model = Arima::new(1, 0, 0).unwrap();
        assert!(matches!(model.fit(&data), Err(TsError::InvalidData(_))));
    }
}
