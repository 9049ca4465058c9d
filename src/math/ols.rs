//! Least squares solver.
//!
//! The beta estimate is the slope of a simple regression:
//!
//! ```text
//! minimize Σ (y_i - α - β x_i)^2
//! ```
//!
//! We standardize `x` to `z = (x - mean) / sd`, build the `n × 2` design matrix
//! `[1, z_i]` and solve with SVD. The standardized columns are orthogonal with
//! equal norms, so the solve does not depend on the magnitude of the returns.

use nalgebra::{DMatrix, DVector};

/// Relative cutoff for singular values, as a fraction of the largest one.
const SINGULAR_TOL: f64 = 1e-12;

/// Solve a least squares problem using SVD.
///
/// Singular values below `SINGULAR_TOL` times the largest are treated as zero.
/// Returns `None` if the matrix has no usable singular values or the solution
/// is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    let largest = svd.singular_values.max();
    if !(largest.is_finite() && largest > 0.0) {
        return None;
    }

    let coef = svd.solve(y, SINGULAR_TOL * largest).ok()?;
    coef.iter().all(|v| v.is_finite()).then_some(coef)
}

/// Fit `y = intercept + slope * x`; returns `(intercept, slope)`.
///
/// `None` for mismatched or short input, or when `x` has no spread.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let mx = mean(x)?;
    let sd = variance(x, mx).sqrt();
    if !(sd.is_finite() && sd > 0.0) {
        return None;
    }

    let n = x.len();
    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { (x[i] - mx) / sd });
    let target = DVector::from_column_slice(y);

    let coef = solve_least_squares(&design, &target)?;
    let slope = coef[1] / sd;
    Some((coef[0] - slope * mx, slope))
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population variance around `mean`.
pub fn variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}
