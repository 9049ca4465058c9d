//! Daily return series.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::domain::{PriceSeries, ReturnPoint, ReturnSeries};

/// Pairwise percentage change between consecutive prices.
///
/// Each return is dated by the later price of the pair. A pair whose prior price
/// is exactly zero has no defined return and is skipped. Series with fewer than
/// two points yield an empty result.
pub fn compute_returns(series: &PriceSeries) -> ReturnSeries {
    let points = series.points();
    let mut out = Vec::with_capacity(points.len().saturating_sub(1));

    for pair in points.windows(2) {
        let prev = pair[0].price;
        let curr = pair[1].price;
        if prev == 0.0 {
            tracing::debug!(symbol = series.symbol(), date = %pair[1].date, "skipping return after zero price");
            continue;
        }
        out.push(ReturnPoint {
            date: pair[1].date,
            value: (curr - prev) / prev,
        });
    }

    ReturnSeries::from_points(out)
}

/// Keep only the dates present in both series, preserving order.
///
/// Returns `(a', b')` with equal lengths and matching dates element by element.
pub fn align_returns(a: &ReturnSeries, b: &ReturnSeries) -> (ReturnSeries, ReturnSeries) {
    let a_dates: HashSet<NaiveDate> = a.points().iter().map(|p| p.date).collect();
    let b_dates: HashSet<NaiveDate> = b.points().iter().map(|p| p.date).collect();

    let keep = |series: &ReturnSeries, other: &HashSet<NaiveDate>| {
        ReturnSeries::from_points(
            series
                .points()
                .iter()
                .filter(|p| other.contains(&p.date))
                .copied()
                .collect(),
        )
    };

    (keep(a, &b_dates), keep(b, &a_dates))
}
