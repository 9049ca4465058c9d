//! Shared CAPM pipeline logic.
//!
//! Per configured year:
//! fetch equity + market -> daily returns -> align -> beta -> fetch rate -> average -> CAPM
//!
//! The CLI focuses on presentation; everything that can fail for a year lives here
//! and surfaces as a typed `CapmError` tagged with that year.

use rayon::prelude::*;

use crate::capm::{align_returns, average_annual_rate, compute_returns, expected_return, regress};
use crate::data::PriceSource;
use crate::domain::{CapmConfig, YearOutcome, YearlyResult, year_window};
use crate::error::CapmError;

/// Run every configured year and stop at the first failure.
///
/// On failure no result for the failing year (or any later year) is returned,
/// only its error. With `config.parallel` all years are computed and the error of
/// the earliest failing year, in configured order, is reported.
pub fn run_capm<S: PriceSource>(config: &CapmConfig, source: &S) -> Result<Vec<YearlyResult>, CapmError> {
    config.validate()?;

    if config.parallel {
        return config
            .years
            .par_iter()
            .map(|&year| run_year(config, source, year).map_err(|e| e.in_year(year)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
    }

    let mut results = Vec::with_capacity(config.years.len());
    for &year in &config.years {
        let result = run_year(config, source, year).map_err(|e| e.in_year(year))?;
        results.push(result);
    }
    Ok(results)
}

/// Run every configured year, recording failures per year instead of stopping.
pub fn run_capm_outcomes<S: PriceSource>(config: &CapmConfig, source: &S) -> Result<Vec<YearOutcome>, CapmError> {
    config.validate()?;

    let outcome = |year: i32| {
        let result = run_year(config, source, year).map_err(|e| e.in_year(year));
        if let Err(err) = &result {
            tracing::warn!(year, kind = err.kind(), "{err}");
        }
        YearOutcome { year, result }
    };

    let outcomes: Vec<YearOutcome> = if config.parallel {
        config.years.par_iter().map(|&year| outcome(year)).collect()
    } else {
        config.years.iter().map(|&year| outcome(year)).collect()
    };
    Ok(outcomes)
}

/// CAPM estimate for one calendar year.
pub fn run_year<S: PriceSource>(config: &CapmConfig, source: &S, year: i32) -> Result<YearlyResult, CapmError> {
    let (start, end) = year_window(year)?;

    let bank = source.fetch(&config.bank_symbol, start, end)?;
    let market = source.fetch(&config.market_symbol, start, end)?;

    let bank_returns = compute_returns(&bank);
    let market_returns = compute_returns(&market);
    let (market_returns, bank_returns) = align_returns(&market_returns, &bank_returns);
    let fit = regress(&market_returns, &bank_returns)?;

    let rates = source.fetch(&config.risk_free_symbol, start, end)?;
    let risk_free_rate = average_annual_rate(&rates, config.rate_scale)?;

    let daily_mean = market_returns.mean().ok_or(CapmError::InsufficientData {
        what: "market mean return",
        needed: 1,
        got: 0,
    })?;
    let market_mean_return = config.market_basis.scale(daily_mean);
    let expected = expected_return(risk_free_rate, fit.beta, market_mean_return)?;

    tracing::info!(
        year,
        beta = fit.beta,
        risk_free_rate,
        expected_return = expected,
        observations = fit.n,
        "computed CAPM estimate"
    );

    Ok(YearlyResult {
        year,
        beta: fit.beta,
        alpha: fit.alpha,
        r_squared: fit.r_squared,
        risk_free_rate,
        market_mean_return,
        expected_return: expected,
        observations: fit.n,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use approx::assert_relative_eq;
    use chrono::{Datelike, Days, NaiveDate};

    use super::*;
    use crate::data::SyntheticSource;
    use crate::domain::{FailurePolicy, MarketBasis, PricePoint, PriceSeries};

    /// Fixed prices per (symbol, year) on consecutive days from Jan 2; records every fetch.
    #[derive(Default)]
    struct FakeSource {
        prices: HashMap<(String, i32), Vec<f64>>,
        failing: HashSet<(String, i32)>,
        calls: Mutex<Vec<(String, i32)>>,
    }

    impl FakeSource {
        fn with(mut self, symbol: &str, year: i32, prices: &[f64]) -> Self {
            self.prices.insert((symbol.to_string(), year), prices.to_vec());
            self
        }

        fn failing(mut self, symbol: &str, year: i32) -> Self {
            self.failing.insert((symbol.to_string(), year));
            self
        }

        fn calls(&self) -> Vec<(String, i32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PriceSource for FakeSource {
        fn fetch(&self, symbol: &str, start: NaiveDate, _end: NaiveDate) -> Result<PriceSeries, CapmError> {
            let key = (symbol.to_string(), start.year());
            self.calls.lock().unwrap().push(key.clone());

            if self.failing.contains(&key) {
                return Err(CapmError::DataFetch {
                    symbol: symbol.to_string(),
                    reason: "connection refused".to_string(),
                });
            }

            let first = NaiveDate::from_ymd_opt(start.year(), 1, 2).unwrap();
            let points = self
                .prices
                .get(&key)
                .map(|prices| {
                    prices
                        .iter()
                        .enumerate()
                        .map(|(i, &p)| PricePoint::new(first + Days::new(i as u64), p))
                        .collect()
                })
                .unwrap_or_default();
            PriceSeries::new(symbol, points)
        }
    }

    fn config(years: &[i32]) -> CapmConfig {
        CapmConfig {
            bank_symbol: "BANK".to_string(),
            market_symbol: "MKT".to_string(),
            risk_free_symbol: "RATE".to_string(),
            years: years.to_vec(),
            ..CapmConfig::default()
        }
    }

    // 2019: market returns +10%, -10%, +10%; bank is exactly 2x the market.
    // 2020: market returns +5%, -2%; bank is exactly 0.5x the market.
    fn two_year_source() -> FakeSource {
        FakeSource::default()
            .with("MKT", 2019, &[100.0, 110.0, 99.0, 108.9])
            .with("BANK", 2019, &[50.0, 60.0, 48.0, 57.6])
            .with("RATE", 2019, &[2.0, 3.0])
            .with("MKT", 2020, &[100.0, 105.0, 102.9])
            .with("BANK", 2020, &[200.0, 205.0, 202.95])
            .with("RATE", 2020, &[1.0, 1.0, 1.0])
    }

    #[test]
    fn two_years_match_hand_computed_values() {
        let results = run_capm(&config(&[2019, 2020]), &two_year_source()).unwrap();
        assert_eq!(results.len(), 2);

        let y2019 = &results[0];
        assert_eq!(y2019.year, 2019);
        assert_relative_eq!(y2019.beta, 2.0, epsilon = 1e-9);
        assert_relative_eq!(y2019.risk_free_rate, 0.025, epsilon = 1e-12);
        assert_relative_eq!(y2019.market_mean_return, 0.1 / 3.0, epsilon = 1e-9);
        // 0.025 + 2 * (0.0333.. - 0.025)
        assert_relative_eq!(y2019.expected_return, 0.025 + 2.0 * (0.1 / 3.0 - 0.025), epsilon = 1e-9);
        assert_eq!(y2019.observations, 3);

        let y2020 = &results[1];
        assert_eq!(y2020.year, 2020);
        assert_relative_eq!(y2020.beta, 0.5, epsilon = 1e-9);
        assert_relative_eq!(y2020.risk_free_rate, 0.01, epsilon = 1e-12);
        assert_relative_eq!(y2020.market_mean_return, 0.015, epsilon = 1e-9);
        assert_relative_eq!(y2020.expected_return, 0.0125, epsilon = 1e-9);
    }

    #[test]
    fn failure_in_second_year_aborts_the_run() {
        let source = two_year_source().failing("BANK", 2020);
        let err = run_capm(&config(&[2019, 2020]), &source).unwrap_err();

        assert!(matches!(err, CapmError::Year { year: 2020, .. }));
        assert_eq!(err.kind(), "data-fetch");

        // Nothing else was fetched for 2020 after the failure.
        let calls_2020: Vec<String> = source
            .calls()
            .into_iter()
            .filter(|(_, y)| *y == 2020)
            .map(|(s, _)| s)
            .collect();
        assert_eq!(calls_2020, vec!["BANK".to_string()]);
    }

    #[test]
    fn abort_skips_later_years() {
        let source = two_year_source().failing("MKT", 2019);
        let err = run_capm(&config(&[2019, 2020]), &source).unwrap_err();

        assert!(matches!(err, CapmError::Year { year: 2019, .. }));
        assert!(source.calls().iter().all(|(_, y)| *y == 2019));
    }

    #[test]
    fn continue_policy_marks_only_the_failed_year() {
        let source = two_year_source().failing("RATE", 2019);
        let config = CapmConfig {
            failure_policy: FailurePolicy::Continue,
            ..config(&[2019, 2020])
        };
        let outcomes = run_capm_outcomes(&config, &source).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].year, 2019);
        assert_eq!(outcomes[0].result.as_ref().unwrap_err().kind(), "data-fetch");
        assert_relative_eq!(outcomes[1].result.as_ref().unwrap().beta, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn empty_rate_series_is_missing_rate_data() {
        let source = FakeSource::default()
            .with("MKT", 2021, &[100.0, 101.0, 99.0])
            .with("BANK", 2021, &[10.0, 10.2, 9.9]);
        let err = run_capm(&config(&[2021]), &source).unwrap_err();
        assert_eq!(err.kind(), "missing-rate-data");
    }

    #[test]
    fn flat_market_is_degenerate() {
        let source = FakeSource::default()
            .with("MKT", 2021, &[100.0, 100.0, 100.0])
            .with("BANK", 2021, &[10.0, 10.2, 9.9])
            .with("RATE", 2021, &[1.0]);
        let err = run_capm(&config(&[2021]), &source).unwrap_err();
        assert_eq!(err.kind(), "degenerate-regression");
    }

    #[test]
    fn missing_prices_are_insufficient_data() {
        let source = FakeSource::default().with("RATE", 2021, &[1.0]);
        let err = run_capm(&config(&[2021]), &source).unwrap_err();
        assert_eq!(err.kind(), "insufficient-data");
    }

    #[test]
    fn annualized_basis_scales_market_mean() {
        let config = CapmConfig {
            market_basis: MarketBasis::Annualized,
            ..config(&[2020])
        };
        let results = run_capm(&config, &two_year_source()).unwrap();
        assert_relative_eq!(results[0].market_mean_return, 0.015 * 252.0, epsilon = 1e-9);
        assert_relative_eq!(
            results[0].expected_return,
            0.01 + 0.5 * (0.015 * 252.0 - 0.01),
            epsilon = 1e-9
        );
    }

    #[test]
    fn invalid_config_fails_before_fetching() {
        let source = two_year_source();
        let err = run_capm(&config(&[]), &source).unwrap_err();
        assert!(matches!(err, CapmError::InvalidConfig(_)));
        assert!(source.calls().is_empty());
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let source = SyntheticSource::new(11, "MKT", "RATE");
        let sequential = run_capm(&config(&[2018, 2019, 2020, 2021]), &source).unwrap();
        let parallel = run_capm(
            &CapmConfig {
                parallel: true,
                ..config(&[2018, 2019, 2020, 2021])
            },
            &source,
        )
        .unwrap();

        assert_eq!(sequential, parallel);
        let years: Vec<i32> = parallel.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2018, 2019, 2020, 2021]);
    }

    #[test]
    fn parallel_abort_reports_earliest_failing_year() {
        let source = two_year_source()
            .with("MKT", 2021, &[100.0, 101.0])
            .failing("BANK", 2020)
            .failing("BANK", 2021);
        let config = CapmConfig {
            parallel: true,
            ..config(&[2019, 2020, 2021])
        };
        let err = run_capm(&config, &source).unwrap_err();
        assert!(matches!(err, CapmError::Year { year: 2020, .. }));
    }
}
