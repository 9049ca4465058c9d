//! CAPM computation: returns, beta, risk-free averaging, and the expected-return formula.
//!
//! Everything here is pure; fetching and rendering live in `data` and `plot`.

pub mod beta;
pub mod rate;
pub mod returns;

pub use beta::{Regression, compute_beta, regress};
pub use rate::average_annual_rate;
pub use returns::{align_returns, compute_returns};

use crate::error::CapmError;

/// CAPM expected return: `rf + β (E[Rm] - rf)`.
///
/// Inputs must be finite.
pub fn expected_return(risk_free: f64, beta: f64, market_mean_return: f64) -> Result<f64, CapmError> {
    if !risk_free.is_finite() {
        return Err(CapmError::NonFiniteInput("risk-free rate"));
    }
    if !beta.is_finite() {
        return Err(CapmError::NonFiniteInput("beta"));
    }
    if !market_mean_return.is_finite() {
        return Err(CapmError::NonFiniteInput("market mean return"));
    }

    Ok(risk_free + beta * (market_mean_return - risk_free))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_beta_with_equal_rates_returns_the_rate() {
        assert_eq!(expected_return(0.02, 1.0, 0.02).unwrap(), 0.02);
    }

    #[test]
    fn premium_is_scaled_by_beta() {
        assert_relative_eq!(expected_return(0.03, 1.5, 0.08).unwrap(), 0.105, epsilon = 1e-12);
    }

    #[test]
    fn negative_premium_lowers_expected_return() {
        // Daily market mean well below an annual risk-free yield.
        let er = expected_return(0.02, 1.2, 0.0005).unwrap();
        assert_relative_eq!(er, 0.02 + 1.2 * (0.0005 - 0.02), epsilon = 1e-15);
        assert!(er < 0.0);
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        assert!(matches!(
            expected_return(f64::NAN, 1.0, 0.01),
            Err(CapmError::NonFiniteInput("risk-free rate"))
        ));
        assert!(matches!(
            expected_return(0.01, f64::INFINITY, 0.01),
            Err(CapmError::NonFiniteInput("beta"))
        ));
        assert!(matches!(
            expected_return(0.01, 1.0, f64::NEG_INFINITY),
            Err(CapmError::NonFiniteInput("market mean return"))
        ));
    }
}
