//! Fourier design matrix and a small ridge least-squares solver

use super::SeasonalComponent;
use crate::{Result, TsError};
use std::f64::consts::PI;

/// Build one row per time point: `[sin(2πkt/P), cos(2πkt/P)]` for k in
/// 1..=order, for every component in order.
pub fn fourier_features(t_days: &[f64], components: &[SeasonalComponent]) -> Vec<Vec<f64>> {
    let width: usize = components.iter().map(|c| 2 * c.fourier_order).sum();
    t_days
        .iter()
        .map(|t| {
            let mut row = Vec::with_capacity(width);
            for c in components {
                for k in 1..=c.fourier_order {
                    let angle = 2.0 * PI * k as f64 * t / c.period;
                    row.push(angle.sin());
                    row.push(angle.cos());
                }
            }
            row
        })
        .collect()
}

/// Solve `(XᵀX + λI) β = Xᵀy` by Gauss-Jordan elimination with partial pivoting
pub fn ridge_solve(x: &[Vec<f64>], y: &[f64], lambda: f64) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(TsError::InvalidData(format!(
            "design has {} rows but target has {}",
            x.len(),
            y.len()
        )));
    }
    let p = x.first().map_or(0, Vec::len);
    if p == 0 {
        return Ok(Vec::new());
    }
    if x.iter().any(|row| row.len() != p) {
        return Err(TsError::InvalidData("ragged design matrix".to_string()));
    }

    let mut a = vec![vec![0.0; p]; p];
    let mut b = vec![0.0; p];
    for (row, yi) in x.iter().zip(y.iter()) {
        for i in 0..p {
            b[i] += row[i] * yi;
            for j in 0..p {
                a[i][j] += row[i] * row[j];
            }
        }
    }
    for (d, a_row) in a.iter_mut().enumerate() {
        a_row[d] += lambda;
    }

    for col in 0..p {
        let pivot_row = (col..p)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(TsError::NumericalError(
                "singular normal equations".to_string(),
            ));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let inv = 1.0 / a[col][col];
        for j in col..p {
            a[col][j] *= inv;
        }
        b[col] *= inv;

        for r in 0..p {
            if r == col {
                continue;
            }
            let factor = a[r][col];
            if factor == 0.0 {
                continue;
            }
            for j in col..p {
                a[r][j] -= factor * a[col][j];
            }
            b[r] -= factor * b[col];
        }
    }

    Ok(b)
}
