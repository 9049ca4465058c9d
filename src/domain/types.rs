//! Shared domain types.
//!
//! Series types own their ordering invariants: a `PriceSeries` is always sorted by
//! date with no duplicates, so downstream code can zip and align without re-checking.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CapmError;

/// Trading days used to annualize a daily mean return.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// One observation of a price (or quoted yield).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Ordered price observations for a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date.
    ///
    /// Non-finite prices count as missing observations and are dropped.
    /// Duplicate dates are rejected.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, CapmError> {
        let symbol = symbol.into();
        let total = points.len();
        let mut points: Vec<PricePoint> = points.into_iter().filter(|p| p.price.is_finite()).collect();
        let dropped = total - points.len();
        if dropped > 0 {
            tracing::debug!(%symbol, dropped, "dropped missing observations");
        }

        points.sort_by_key(|p| p.date);
        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(CapmError::InvalidSeries(format!(
                "duplicate date {} in {symbol}",
                pair[0].date
            )));
        }

        Ok(Self { symbol, points })
    }

    /// An empty series for `symbol`.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// A fractional return dated by the later price of its pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Ordered fractional returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn from_points(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arithmetic mean, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.values().sum::<f64>() / self.points.len() as f64)
    }
}

/// How the market mean return entering the CAPM formula is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarketBasis {
    /// Mean of daily returns, as computed from the price series.
    Daily,
    /// Mean daily return scaled by 252 trading days.
    Annualized,
}

impl MarketBasis {
    pub fn scale(self, daily_mean: f64) -> f64 {
        match self {
            MarketBasis::Daily => daily_mean,
            MarketBasis::Annualized => daily_mean * TRADING_DAYS_PER_YEAR,
        }
    }
}

/// What to do when a year fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing year and report its error.
    Abort,
    /// Keep processing; failed years carry an error marker.
    Continue,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct CapmConfig {
    pub bank_symbol: String,
    pub market_symbol: String,
    pub risk_free_symbol: String,
    pub years: Vec<i32>,
    /// Divisor applied to the averaged risk-free quote (100 for percent quotes).
    pub rate_scale: f64,
    pub market_basis: MarketBasis,
    pub failure_policy: FailurePolicy,
    /// Compute years concurrently (results keep configured order).
    pub parallel: bool,
}

impl Default for CapmConfig {
    fn default() -> Self {
        Self {
            bank_symbol: "JPM".to_string(),
            market_symbol: "^GSPC".to_string(),
            risk_free_symbol: "^TNX".to_string(),
            years: vec![2019, 2020, 2021, 2022, 2023],
            rate_scale: 100.0,
            market_basis: MarketBasis::Daily,
            failure_policy: FailurePolicy::Abort,
            parallel: false,
        }
    }
}

impl CapmConfig {
    pub fn validate(&self) -> Result<(), CapmError> {
        for (name, symbol) in [
            ("bank", &self.bank_symbol),
            ("market", &self.market_symbol),
            ("risk-free", &self.risk_free_symbol),
        ] {
            if symbol.trim().is_empty() {
                return Err(CapmError::InvalidConfig(format!("{name} symbol is empty")));
            }
        }

        if self.years.is_empty() {
            return Err(CapmError::InvalidConfig("no years configured".to_string()));
        }
        for (i, &year) in self.years.iter().enumerate() {
            if !(1000..=9999).contains(&year) {
                return Err(CapmError::InvalidConfig(format!("year {year} is not a 4-digit year")));
            }
            if self.years[..i].contains(&year) {
                return Err(CapmError::InvalidConfig(format!("year {year} listed twice")));
            }
        }

        if !(self.rate_scale.is_finite() && self.rate_scale > 0.0) {
            return Err(CapmError::InvalidConfig(format!(
                "rate scale must be positive, got {}",
                self.rate_scale
            )));
        }

        Ok(())
    }
}

/// Inclusive calendar window `[year-01-01, year-12-31]`.
pub fn year_window(year: i32) -> Result<(NaiveDate, NaiveDate), CapmError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(CapmError::InvalidConfig(format!("year {year} is out of range"))),
    }
}

/// CAPM outputs for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyResult {
    pub year: i32,
    pub beta: f64,
    /// Regression intercept (daily alpha).
    pub alpha: f64,
    pub r_squared: f64,
    pub risk_free_rate: f64,
    /// Market mean return as fed to the formula (see `MarketBasis`).
    pub market_mean_return: f64,
    pub expected_return: f64,
    /// Aligned return observations used in the regression.
    pub observations: usize,
}

/// A year's result or the error that prevented it.
#[derive(Debug)]
pub struct YearOutcome {
    pub year: i32,
    pub result: Result<YearlyResult, CapmError>,
}
