//! PM2.5 to AQI conversion (CPCB breakpoints).

/// Upper bound of the AQI scale
pub const AQI_MAX: f64 = 500.0;

/// `(pm_low, pm_high, aqi_low, aqi_high)` segments
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
    (0.0, 30.0, 0.0, 50.0),
    (30.0, 60.0, 50.0, 100.0),
    (60.0, 90.0, 100.0, 200.0),
    (90.0, 120.0, 200.0, 300.0),
    (120.0, 250.0, 300.0, 400.0),
    (250.0, 380.0, 400.0, 500.0),
];

/// Piecewise-linear AQI for a PM2.5 concentration. Concentrations above the
/// last breakpoint saturate at [`AQI_MAX`].
pub fn aqi_from_pm25(pm25: f64) -> f64 {
    if pm25.is_nan() {
        return 0.0;
    }
    let pm = pm25.max(0.0);
    PM25_BREAKPOINTS
        .iter()
        .find(|(_, hi, _, _)| pm <= *hi)
        .map(|&(lo, hi, aqi_lo, aqi_hi)| aqi_lo + (pm - lo) * (aqi_hi - aqi_lo) / (hi - lo))
        .unwrap_or(AQI_MAX)
}

/// Clamp to `[0, AQI_MAX]`; NaN maps to 0.
pub fn clamp_aqi(aqi: f64) -> f64 {
    if aqi.is_nan() {
        0.0
    } else {
        aqi.clamp(0.0, AQI_MAX)
    }
}
