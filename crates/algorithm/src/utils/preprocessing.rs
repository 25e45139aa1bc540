//! Series preparation: means over partially observed data, imputation,
//! lag tables and rounding.

/// Arithmetic mean; 0 for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Mean of the observed values, `None` when nothing is observed
pub fn observed_mean(data: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = data
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Replace missing values with the mean of the observed ones.
///
/// A series with no observed value is returned unchanged.
pub fn impute_mean(data: &[Option<f64>]) -> Vec<Option<f64>> {
    match observed_mean(data) {
        Some(fill) => data.iter().map(|v| Some(v.unwrap_or(fill))).collect(),
        None => data.to_vec(),
    }
}

/// Build a supervised table from a series.
///
/// Row `i` has target `data[i]` and features `[data[i-1], .., data[i-n_lags]]`.
/// The first `n_lags` points have incomplete history and produce no row.
pub fn lag_table(data: &[f64], n_lags: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    if n_lags == 0 || data.len() <= n_lags {
        return (Vec::new(), Vec::new());
    }

    (n_lags..data.len())
        .map(|i| {
            let features: Vec<f64> = (1..=n_lags).map(|lag| data[i - lag]).collect();
            (features, data[i])
        })
        .unzip()
}

/// First-order differences applied `order` times
pub fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
