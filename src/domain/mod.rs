//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - price and return series (`PriceSeries`, `ReturnSeries`)
//! - run configuration (`CapmConfig`, `MarketBasis`, `FailurePolicy`)
//! - per-year outputs (`YearlyResult`, `YearOutcome`)

pub mod types;

pub use types::*;
