//! Chart rendering for the per-year expected returns.
//!
//! Renderers receive `(year, expected return in percent)` pairs that are already
//! computed; they only draw. Both renderers share the same layout rules:
//! one marker per year, a value label above each marker, a dashed reference line
//! at 0%, and vertical bounds one point beyond the extreme values.

use std::path::PathBuf;

use crate::error::CapmError;

pub mod ascii;
pub mod svg;

pub use ascii::{AsciiChartRenderer, render_ascii_chart};
pub use svg::SvgChartRenderer;

/// Title and axis labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl ChartLabels {
    /// Labels for the expected-return chart of `symbol`.
    pub fn expected_return(symbol: &str) -> Self {
        Self {
            title: format!("CAPM-derived Expected Return for {symbol}"),
            x_label: "Year".to_string(),
            y_label: "Expected Return (%)".to_string(),
        }
    }
}

/// Draws a labeled line chart of `(year, percent)` points.
pub trait ChartRenderer {
    fn render(&self, points: &[(i32, f64)], labels: &ChartLabels) -> Result<(), CapmError>;
}

/// Where the chart goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartTarget {
    Svg(PathBuf),
    Ascii { width: usize, height: usize },
}

impl ChartTarget {
    pub fn renderer(&self) -> Box<dyn ChartRenderer> {
        match self {
            ChartTarget::Svg(path) => Box::new(SvgChartRenderer::new(path.clone())),
            ChartTarget::Ascii { width, height } => Box::new(AsciiChartRenderer::new(*width, *height)),
        }
    }
}

/// Vertical bounds `[min - 1, max + 1]` over the finite values.
pub fn value_bounds(points: &[(i32, f64)]) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for &(_, v) in points {
        if v.is_finite() {
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
    }
    if min_v.is_finite() && max_v.is_finite() {
        Some((min_v - 1.0, max_v + 1.0))
    } else {
        None
    }
}

/// Percent label shown next to each marker.
pub fn format_percent(v: f64) -> String {
    format!("{v:.2}%")
}
