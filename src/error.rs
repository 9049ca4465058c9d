//! Error types.
//!
//! - `CapmError`: typed failures of the CAPM pipeline (fetch, regression, rates, rendering)
//! - `AppError`: what the binary reports (exit code + one-line message)

use thiserror::Error;

/// Failure kinds of a CAPM run.
#[derive(Debug, Error)]
pub enum CapmError {
    /// The data provider could not be reached or rejected the request.
    #[error("failed to fetch {symbol}: {reason}")]
    DataFetch { symbol: String, reason: String },

    /// A series has too few points for the requested computation.
    #[error("insufficient data for {what}: need at least {needed} points, got {got}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    /// The market return series has zero variance.
    #[error("degenerate regression: market returns have zero variance")]
    DegenerateRegression,

    /// No risk-free observations for the requested period.
    #[error("no rate data available for period ({symbol})")]
    MissingRateData { symbol: String },

    /// Return series passed to the regression are not aligned.
    #[error("misaligned return series: market has {market} points, asset has {asset}")]
    MisalignedSeries { market: usize, asset: usize },

    /// A price series violates its ordering invariants.
    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    /// A NaN or infinite value reached a computation.
    #[error("non-finite input: {0}")]
    NonFiniteInput(&'static str),

    /// Run configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The chart could not be drawn or written.
    #[error("failed to render chart: {0}")]
    Render(String),

    /// A failure attributed to one configured year.
    #[error("year {year}: {source}")]
    Year {
        year: i32,
        #[source]
        source: Box<CapmError>,
    },
}

impl CapmError {
    /// Attach the year being processed.
    pub fn in_year(self, year: i32) -> Self {
        match self {
            CapmError::Year { .. } => self,
            other => CapmError::Year {
                year,
                source: Box::new(other),
            },
        }
    }

    /// Innermost error, skipping any `Year` wrapper.
    pub fn root(&self) -> &CapmError {
        match self {
            CapmError::Year { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stable short name used in reported messages.
    pub fn kind(&self) -> &'static str {
        match self.root() {
            CapmError::DataFetch { .. } => "data-fetch",
            CapmError::InsufficientData { .. } => "insufficient-data",
            CapmError::DegenerateRegression => "degenerate-regression",
            CapmError::MissingRateData { .. } => "missing-rate-data",
            CapmError::MisalignedSeries { .. } => "misaligned-series",
            CapmError::InvalidSeries(_) => "invalid-series",
            CapmError::NonFiniteInput(_) => "non-finite-input",
            CapmError::InvalidConfig(_) => "invalid-config",
            CapmError::Render(_) => "render",
            CapmError::Year { .. } => "year",
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self.root() {
            CapmError::InvalidConfig(_) => 2,
            CapmError::DataFetch { .. } => 3,
            CapmError::Render(_) => 5,
            _ => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CapmError> for AppError {
    fn from(err: CapmError) -> Self {
        AppError::new(
            err.exit_code(),
            format!("Error occurred ({}): {err}", err.kind()),
        )
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_wrapper_keeps_inner_kind() {
        let err = CapmError::DegenerateRegression.in_year(2021);
        assert_eq!(err.kind(), "degenerate-regression");
        assert_eq!(err.to_string(), "year 2021: degenerate regression: market returns have zero variance");

        // Re-wrapping does not nest.
        let err = err.in_year(2022);
        assert!(matches!(err, CapmError::Year { year: 2021, .. }));
    }

    #[test]
    fn hand_nested_year_wrappers_resolve_to_the_inner_kind() {
        let err = CapmError::Year {
            year: 2020,
            source: Box::new(CapmError::Render("out.svg".to_string()).in_year(2020)),
        };
        assert_eq!(err.kind(), "render");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn app_error_names_the_kind() {
        let err = CapmError::DataFetch {
            symbol: "JPM".to_string(),
            reason: "timeout".to_string(),
        }
        .in_year(2019);
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 3);
        assert_eq!(
            app.to_string(),
            "Error occurred (data-fetch): year 2019: failed to fetch JPM: timeout"
        );
    }
}
