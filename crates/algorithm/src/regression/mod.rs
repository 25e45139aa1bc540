//! Regression and statistical models
//!
//! - **ARIMA**: autoregressive integrated moving average, Yule-Walker AR fit
//! - **Linear trend**: ordinary least squares against a sample index

pub mod arima;
pub mod linear;

pub use arima::Arima;
pub use linear::LinearTrend;
