//! Deterministic synthetic prices for offline runs.
//!
//! The market follows a geometric random walk on business days. Any other equity
//! symbol is driven by the same market shocks scaled by `equity_beta` plus its own
//! noise, so the pipeline recovers a beta close to `equity_beta`. The risk-free
//! symbol produces a yield quoted in percent.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::PriceSource;
use crate::domain::{PricePoint, PriceSeries};
use crate::error::CapmError;

const MARKET_DRIFT: f64 = 0.0004;
const MARKET_VOL: f64 = 0.011;
const IDIO_VOL: f64 = 0.008;
const RATE_START_PCT: f64 = 2.5;
const RATE_STEP_PCT: f64 = 0.03;
const RATE_FLOOR_PCT: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    market_symbol: String,
    risk_free_symbol: String,
    equity_beta: f64,
}

impl SyntheticSource {
    pub fn new(seed: u64, market_symbol: impl Into<String>, risk_free_symbol: impl Into<String>) -> Self {
        Self {
            seed,
            market_symbol: market_symbol.into(),
            risk_free_symbol: risk_free_symbol.into(),
            equity_beta: 1.2,
        }
    }

    pub fn with_equity_beta(mut self, beta: f64) -> Self {
        self.equity_beta = beta;
        self
    }

    fn rng_for(&self, symbol: &str, start: NaiveDate) -> StdRng {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        symbol.hash(&mut hasher);
        start.hash(&mut hasher);
        StdRng::seed_from_u64(hasher.finish())
    }

    fn market_returns(&self, start: NaiveDate, days: usize) -> Result<Vec<f64>, CapmError> {
        let normal = noise(MARKET_DRIFT, MARKET_VOL)?;
        let mut rng = self.rng_for(&self.market_symbol, start);
        Ok((0..days).map(|_| normal.sample(&mut rng)).collect())
    }

    fn equity_returns(&self, symbol: &str, start: NaiveDate, days: usize) -> Result<Vec<f64>, CapmError> {
        let market = self.market_returns(start, days)?;
        let normal = noise(0.0, IDIO_VOL)?;
        let mut rng = self.rng_for(symbol, start);
        Ok(market
            .into_iter()
            .map(|m| self.equity_beta * m + normal.sample(&mut rng))
            .collect())
    }

    fn rate_levels(&self, start: NaiveDate, days: usize) -> Result<Vec<f64>, CapmError> {
        let normal = noise(0.0, RATE_STEP_PCT)?;
        let mut rng = self.rng_for(&self.risk_free_symbol, start);
        let mut level = RATE_START_PCT;
        Ok((0..days)
            .map(|_| {
                level = (level + normal.sample(&mut rng)).max(RATE_FLOOR_PCT);
                level
            })
            .collect())
    }
}

impl PriceSource for SyntheticSource {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, CapmError> {
        let dates = business_days(start, end);
        if dates.is_empty() {
            return Ok(PriceSeries::empty(symbol));
        }

        let values = if symbol == self.risk_free_symbol {
            self.rate_levels(start, dates.len())?
        } else {
            // The first business day carries the starting price, so one fewer return.
            let returns = if symbol == self.market_symbol {
                self.market_returns(start, dates.len() - 1)?
            } else {
                self.equity_returns(symbol, start, dates.len() - 1)?
            };
            compound(100.0, &returns)
        };

        let points = dates
            .into_iter()
            .zip(values)
            .map(|(date, price)| PricePoint::new(date, price))
            .collect();
        PriceSeries::new(symbol, points)
    }
}

fn noise(mean: f64, std_dev: f64) -> Result<Normal<f64>, CapmError> {
    Normal::new(mean, std_dev).map_err(|e| CapmError::InvalidConfig(format!("noise distribution error: {e}")))
}

fn compound(start: f64, returns: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(returns.len() + 1);
    let mut price = start;
    out.push(price);
    for r in returns {
        price *= 1.0 + r;
        out.push(price);
    }
    out
}

fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut day = start;
    while day <= end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    out
}
