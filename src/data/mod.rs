//! Price data collaborators.
//!
//! - `PriceSource`: the seam the pipeline fetches through
//! - `YahooClient`: daily adjusted closes from Yahoo Finance
//! - `SyntheticSource`: deterministic offline prices for demos and tests

use chrono::NaiveDate;

use crate::domain::PriceSeries;
use crate::error::CapmError;

pub mod synthetic;
pub mod yahoo;

pub use synthetic::SyntheticSource;
pub use yahoo::YahooClient;

/// Daily price observations for a symbol over an inclusive date range.
///
/// Non-trading days are simply absent. An empty series is a valid answer; callers
/// decide whether that is an error.
pub trait PriceSource: Sync {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, CapmError>;
}

impl<T: PriceSource + ?Sized> PriceSource for &T {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, CapmError> {
        (**self).fetch(symbol, start, end)
    }
}

impl<T: PriceSource + ?Sized> PriceSource for Box<T> {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, CapmError> {
        (**self).fetch(symbol, start, end)
    }
}
