//! Command-line parsing for the CAPM estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! computation. Every run parameter can also come from the environment (a `.env`
//! file is loaded first), which is how the symbols and years are usually pinned.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::domain::MarketBasis;

/// Where prices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Yahoo Finance daily adjusted closes.
    Yahoo,
    /// Deterministic offline prices (seeded).
    Synthetic,
}

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(name = "capm", version, about = "CAPM expected return for one equity, year by year")]
pub struct Cli {
    /// Equity ticker.
    #[arg(short = 'b', long = "bank", env = "CAPM_BANK_SYMBOL", default_value = "JPM")]
    pub bank: String,

    /// Market index ticker.
    #[arg(short = 'm', long, env = "CAPM_MARKET_SYMBOL", default_value = "^GSPC")]
    pub market: String,

    /// Risk-free proxy ticker (a yield quoted in percent).
    #[arg(long, env = "CAPM_RISK_FREE_SYMBOL", default_value = "^TNX")]
    pub risk_free: String,

    /// Calendar years to estimate, comma-separated.
    #[arg(
        short = 'y',
        long,
        env = "CAPM_YEARS",
        value_delimiter = ',',
        default_values_t = [2019, 2020, 2021, 2022, 2023]
    )]
    pub years: Vec<i32>,

    /// Divisor applied to the averaged risk-free quote.
    #[arg(long, default_value_t = 100.0)]
    pub rate_scale: f64,

    /// Express the market mean return per day or annualized.
    #[arg(long, value_enum, default_value_t = MarketBasis::Daily)]
    pub market_basis: MarketBasis,

    /// Keep going past failed years (they are reported as errors).
    #[arg(long)]
    pub keep_going: bool,

    /// Compute years concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Price data source.
    #[arg(long, value_enum, env = "CAPM_SOURCE", default_value_t = SourceKind::Yahoo)]
    pub source: SourceKind,

    /// Seed for the synthetic source.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Per-request timeout for the Yahoo source (seconds).
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// SVG chart output path.
    #[arg(short = 'o', long, default_value = "capm_expected_return.svg")]
    pub output: PathBuf,

    /// Skip chart rendering.
    #[arg(long)]
    pub no_chart: bool,

    /// Draw the chart in the terminal instead of writing an SVG.
    #[arg(long, conflicts_with = "no_chart")]
    pub ascii: bool,

    /// Terminal chart width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Terminal chart height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// More logging (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}
