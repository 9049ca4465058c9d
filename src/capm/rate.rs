//! Risk-free rate aggregation.

use crate::domain::PriceSeries;
use crate::error::CapmError;

/// Mean of the quoted observations divided by `scale`.
///
/// Yield indices such as `^TNX` quote in percentage points, so `scale = 100`
/// turns the average into a decimal fraction. An empty series is an error rather
/// than a silent zero rate.
pub fn average_annual_rate(series: &PriceSeries, scale: f64) -> Result<f64, CapmError> {
    if !(scale.is_finite() && scale != 0.0) {
        return Err(CapmError::NonFiniteInput("rate scale"));
    }
    if series.is_empty() {
        return Err(CapmError::MissingRateData {
            symbol: series.symbol().to_string(),
        });
    }

    let sum: f64 = series.points().iter().map(|p| p.price).sum();
    Ok(sum / series.len() as f64 / scale)
}
