//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - runs the CAPM pipeline over the configured years
//! - prints the per-year table and renders the chart

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, SourceKind};
use crate::data::{PriceSource, SyntheticSource, YahooClient};
use crate::domain::{CapmConfig, FailurePolicy};
use crate::error::AppError;
use crate::plot::{ChartLabels, ChartTarget};

pub mod pipeline;

/// Entry point for the `capm` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = capm_config_from_args(&cli);
    config.validate()?;
    println!("{}", crate::report::format_run_summary(&config));

    let source = build_source(&cli, &config)?;

    let results = match config.failure_policy {
        FailurePolicy::Abort => {
            let results = pipeline::run_capm(&config, &source)?;
            println!("{}", crate::report::format_results(&results));
            results
        }
        FailurePolicy::Continue => {
            let outcomes = pipeline::run_capm_outcomes(&config, &source)?;
            println!("{}", crate::report::format_outcomes(&outcomes));
            crate::report::successful(&outcomes)
        }
    };

    let Some(target) = chart_target(&cli) else {
        return Ok(());
    };
    if results.is_empty() {
        tracing::warn!("no successful years; skipping chart");
        return Ok(());
    }

    let points = crate::report::chart_points(&results);
    target
        .renderer()
        .render(&points, &ChartLabels::expected_return(&config.bank_symbol))?;
    if let ChartTarget::Svg(path) = &target {
        println!("Chart written to {}", path.display());
    }

    Ok(())
}

pub fn capm_config_from_args(cli: &Cli) -> CapmConfig {
    CapmConfig {
        bank_symbol: cli.bank.trim().to_string(),
        market_symbol: cli.market.trim().to_string(),
        risk_free_symbol: cli.risk_free.trim().to_string(),
        years: cli.years.clone(),
        rate_scale: cli.rate_scale,
        market_basis: cli.market_basis,
        failure_policy: if cli.keep_going {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        },
        parallel: cli.parallel,
    }
}

fn build_source(cli: &Cli, config: &CapmConfig) -> Result<Box<dyn PriceSource>, AppError> {
    let source: Box<dyn PriceSource> = match cli.source {
        SourceKind::Yahoo => Box::new(YahooClient::new(Duration::from_secs(cli.timeout_secs))?),
        SourceKind::Synthetic => Box::new(SyntheticSource::new(
            cli.seed,
            config.market_symbol.clone(),
            config.risk_free_symbol.clone(),
        )),
    };
    Ok(source)
}

fn chart_target(cli: &Cli) -> Option<ChartTarget> {
    if cli.no_chart {
        None
    } else if cli.ascii {
        Some(ChartTarget::Ascii {
            width: cli.width,
            height: cli.height,
        })
    } else {
        Some(ChartTarget::Svg(cli.output.clone()))
    }
}

/// Log to stderr; `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
