//! Yahoo Finance chart API integration (daily adjusted closes).

use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::PriceSource;
use crate::domain::{PricePoint, PriceSeries};
use crate::error::CapmError;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) capm-curve/0.1";

pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    /// Build a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CapmError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CapmError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn request(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<ChartResponse, CapmError> {
        let fetch_err = |reason: String| CapmError::DataFetch {
            symbol: symbol.to_string(),
            reason,
        };

        // `period2` is exclusive, so ask for midnight after `end`.
        let period1 = unix_midnight(start);
        let period2 = end
            .checked_add_days(Days::new(1))
            .map(unix_midnight)
            .ok_or_else(|| fetch_err(format!("end date {end} out of range")))?;

        let url = format!("{BASE_URL}/{symbol}");
        tracing::debug!(%symbol, %start, %end, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .map_err(|e| fetch_err(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            // Yahoo reports unknown symbols with a 404 and an error body; prefer its description.
            let detail = resp
                .json::<ChartResponse>()
                .ok()
                .and_then(|body| body.chart.error)
                .map(|e| e.description)
                .unwrap_or_default();
            return Err(fetch_err(format!("request failed with status {status}. {detail}")));
        }

        resp.json()
            .map_err(|e| fetch_err(format!("failed to parse response: {e}")))
    }
}

impl PriceSource for YahooClient {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, CapmError> {
        let body = self.request(symbol, start, end)?;
        let series = decode_chart(symbol, body, start, end)?;
        tracing::debug!(%symbol, points = series.len(), "fetched prices");
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Turn a chart payload into a price series restricted to `[start, end]`.
///
/// Prefers the adjusted close; falls back to the raw close when the provider omits
/// it (yield indices usually have no adjustments). Null prices are dropped.
pub(crate) fn decode_chart(
    symbol: &str,
    body: ChartResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, CapmError> {
    if let Some(err) = body.chart.error {
        return Err(CapmError::DataFetch {
            symbol: symbol.to_string(),
            reason: format!("{}: {}", err.code, err.description),
        });
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty(symbol));
    };

    let offset = result.meta.map(|m| m.gmtoffset).unwrap_or(0);
    let adjclose = result.indicators.adjclose.into_iter().next().map(|a| a.adjclose);
    let prices = match adjclose {
        Some(values) if !values.is_empty() => values,
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let mut points = Vec::with_capacity(result.timestamp.len());
    for (&ts, price) in result.timestamp.iter().zip(prices) {
        let Some(price) = price else {
            continue;
        };
        let date = DateTime::from_timestamp(ts + offset, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| CapmError::DataFetch {
                symbol: symbol.to_string(),
                reason: format!("invalid timestamp {ts}"),
            })?;
        if date < start || date > end {
            continue;
        }
        points.push(PricePoint::new(date, price));
    }

    PriceSeries::new(symbol, points)
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // 2023-01-03, 2023-01-04, 2023-01-05 and 2024-01-02 at 14:30 UTC (NYSE open).
    const PAYLOAD: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "JPM", "gmtoffset": -18000 },
                "timestamp": [1672756200, 1672842600, 1672929000, 1704205800],
                "indicators": {
                    "quote": [{ "close": [134.7, 135.9, null, 170.0] }],
                    "adjclose": [{ "adjclose": [128.1, 129.3, null, 165.2] }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn decodes_adjusted_closes_and_drops_nulls() {
        let body: ChartResponse = serde_json::from_str(PAYLOAD).unwrap();
        let series = decode_chart("JPM", body, d("2023-01-01"), d("2023-12-31")).unwrap();

        let got: Vec<(String, f64)> = series
            .points()
            .iter()
            .map(|p| (p.date.to_string(), p.price))
            .collect();
        assert_eq!(
            got,
            vec![("2023-01-03".to_string(), 128.1), ("2023-01-04".to_string(), 129.3)]
        );
    }

    #[test]
    fn falls_back_to_close_without_adjclose() {
        let payload = r#"{
            "chart": {
                "result": [{
                    "meta": { "gmtoffset": -18000 },
                    "timestamp": [1672756200, 1672842600],
                    "indicators": { "quote": [{ "close": [3.79, 3.69] }] }
                }],
                "error": null
            }
        }"#;
        let body: ChartResponse = serde_json::from_str(payload).unwrap();
        let series = decode_chart("^TNX", body, d("2023-01-01"), d("2023-12-31")).unwrap();

        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![3.79, 3.69]);
    }

    #[test]
    fn provider_error_is_a_fetch_error() {
        let payload = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }"#;
        let body: ChartResponse = serde_json::from_str(payload).unwrap();
        let err = decode_chart("NOPE", body, d("2023-01-01"), d("2023-12-31")).unwrap_err();

        assert!(matches!(err, CapmError::DataFetch { ref symbol, .. } if symbol == "NOPE"));
        assert!(err.to_string().contains("symbol may be delisted"));
    }

    #[test]
    fn missing_timestamps_give_an_empty_series() {
        let payload = r#"{
            "chart": {
                "result": [{ "meta": { "gmtoffset": 0 }, "indicators": { "quote": [{}] } }],
                "error": null
            }
        }"#;
        let body: ChartResponse = serde_json::from_str(payload).unwrap();
        let series = decode_chart("JPM", body, d("2023-01-01"), d("2023-12-31")).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn unix_midnight_is_utc() {
        assert_eq!(unix_midnight(d("1970-01-02")), 86_400);
    }
}
