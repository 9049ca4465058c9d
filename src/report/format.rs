//! Formatted terminal output.
//!
//! We keep formatting code in one place so the computation stays clean and output
//! changes are localized.

use crate::domain::{CapmConfig, MarketBasis, YearOutcome, YearlyResult};

/// Run header: symbols, years, and conventions in effect.
pub fn format_run_summary(config: &CapmConfig) -> String {
    let mut out = String::new();

    out.push_str("=== capm - CAPM Expected Return ===\n");
    out.push_str(&format!("Equity: {}\n", config.bank_symbol));
    out.push_str(&format!("Market: {}\n", config.market_symbol));
    out.push_str(&format!(
        "Risk-free: {} (quote / {})\n",
        config.risk_free_symbol, config.rate_scale
    ));
    let years: Vec<String> = config.years.iter().map(|y| y.to_string()).collect();
    out.push_str(&format!("Years: {}\n", years.join(", ")));
    out.push_str(&format!(
        "Market mean: {}\n",
        match config.market_basis {
            MarketBasis::Daily => "daily",
            MarketBasis::Annualized => "annualized (x252)",
        }
    ));

    out
}

/// Per-year table; failed years show their error in place of the numbers.
pub fn format_outcomes(outcomes: &[YearOutcome]) -> String {
    let mut out = table_header();
    for outcome in outcomes {
        match &outcome.result {
            Ok(r) => push_row(&mut out, r),
            Err(err) => {
                out.push_str(format!("{:<6} error: {}", outcome.year, err.root()).trim_end());
                out.push('\n');
            }
        }
    }
    out
}

/// Per-year table for a fully successful run.
pub fn format_results(results: &[YearlyResult]) -> String {
    let mut out = table_header();
    for r in results {
        push_row(&mut out, r);
    }
    out
}

fn table_header() -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<6} {:>8} {:>10} {:>6} {:>10} {:>12} {:>10} {:>6}",
            "year", "beta", "alpha", "r2", "rf(%)", "mkt_mean(%)", "E[R](%)", "n"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<6} {:-<8} {:-<10} {:-<6} {:-<10} {:-<12} {:-<10} {:-<6}",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');
    out
}

fn push_row(out: &mut String, r: &YearlyResult) {
    out.push_str(
        format!(
            "{:<6} {:>8.4} {:>10.6} {:>6.3} {:>10.4} {:>12.4} {:>10.4} {:>6}",
            r.year,
            r.beta,
            r.alpha,
            r.r_squared,
            100.0 * r.risk_free_rate,
            100.0 * r.market_mean_return,
            100.0 * r.expected_return,
            r.observations,
        )
        .trim_end(),
    );
    out.push('\n');
}
