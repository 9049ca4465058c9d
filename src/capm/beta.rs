//! Market beta via simple linear regression.
//!
//! `β = Cov(R_a, R_m) / Var(R_m)`, computed as the OLS slope of asset returns
//! (dependent) on market returns (independent).

use crate::domain::ReturnSeries;
use crate::error::CapmError;
use crate::math::{fit_line, mean, variance};

/// Regression of asset returns on market returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    /// Intercept.
    pub alpha: f64,
    /// Slope.
    pub beta: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// Slope of the regression of `asset` on `market`.
pub fn compute_beta(market: &ReturnSeries, asset: &ReturnSeries) -> Result<f64, CapmError> {
    regress(market, asset).map(|fit| fit.beta)
}

/// Full OLS fit of `asset` on `market`.
///
/// Both series must already be aligned: same length and same date at each index.
pub fn regress(market: &ReturnSeries, asset: &ReturnSeries) -> Result<Regression, CapmError> {
    if market.len() != asset.len() {
        return Err(CapmError::MisalignedSeries {
            market: market.len(),
            asset: asset.len(),
        });
    }
    let dates_match = market
        .points()
        .iter()
        .zip(asset.points())
        .all(|(m, a)| m.date == a.date);
    if !dates_match {
        return Err(CapmError::MisalignedSeries {
            market: market.len(),
            asset: asset.len(),
        });
    }

    let n = market.len();
    if n < 2 {
        return Err(CapmError::InsufficientData {
            what: "beta regression",
            needed: 2,
            got: n,
        });
    }

    let x: Vec<f64> = market.values().collect();
    let y: Vec<f64> = asset.values().collect();
    if !x.iter().all(|v| v.is_finite()) {
        return Err(CapmError::NonFiniteInput("market returns"));
    }
    if !y.iter().all(|v| v.is_finite()) {
        return Err(CapmError::NonFiniteInput("asset returns"));
    }

    let mx = mean(&x).ok_or(CapmError::DegenerateRegression)?;
    if is_constant(&x, mx) {
        return Err(CapmError::DegenerateRegression);
    }

    let (alpha, beta) = fit_line(&x, &y).ok_or(CapmError::DegenerateRegression)?;

    let my = mean(&y).ok_or(CapmError::DegenerateRegression)?;
    let ss_tot: f64 = y.iter().map(|v| (v - my).powi(2)).sum();
    let ss_res: f64 = x
        .iter()
        .zip(&y)
        .map(|(xi, yi)| (yi - alpha - beta * xi).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 { (1.0 - ss_res / ss_tot).max(0.0) } else { 0.0 };

    Ok(Regression {
        alpha,
        beta,
        r_squared,
        n,
    })
}

/// Zero variance, allowing for rounding in the mean of identical values.
fn is_constant(values: &[f64], mean: f64) -> bool {
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tol = 16.0 * f64::EPSILON * scale;
    variance(values, mean) <= tol * tol
}
