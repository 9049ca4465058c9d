//! Reporting utilities: chart series and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{YearOutcome, YearlyResult};

/// `(year, expected return in percent)` pairs for the chart, in run order.
pub fn chart_points(results: &[YearlyResult]) -> Vec<(i32, f64)> {
    results.iter().map(|r| (r.year, 100.0 * r.expected_return)).collect()
}

/// Successful results from a continue-on-failure run, in run order.
pub fn successful(outcomes: &[YearOutcome]) -> Vec<YearlyResult> {
    outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapmError;

    fn result(year: i32, expected_return: f64) -> YearlyResult {
        YearlyResult {
            year,
            beta: 1.0,
            alpha: 0.0,
            r_squared: 0.5,
            risk_free_rate: 0.02,
            market_mean_return: 0.001,
            expected_return,
            observations: 250,
        }
    }

    #[test]
    fn chart_points_are_percent() {
        let points = chart_points(&[result(2019, 0.0123), result(2020, -0.05)]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].0, 2019);
        assert!((points[0].1 - 1.23).abs() < 1e-12);
        assert!((points[1].1 + 5.0).abs() < 1e-12);
    }

    #[test]
    fn successful_skips_failed_years() {
        let outcomes = vec![
            YearOutcome {
                year: 2019,
                result: Ok(result(2019, 0.01)),
            },
            YearOutcome {
                year: 2020,
                result: Err(CapmError::DegenerateRegression),
            },
            YearOutcome {
                year: 2021,
                result: Ok(result(2021, 0.02)),
            },
        ];
        let years: Vec<i32> = successful(&outcomes).iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2019, 2021]);
    }
}
