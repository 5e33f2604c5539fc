use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::{PriceHubError, Result};
use crate::fetchers::base::PriceFetcher;
use crate::models::raw::{ColumnLabel, RawColumn, RawTable};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Equity/FX price fetcher backed by the Yahoo Finance chart API
pub struct YahooFetcher {
    client: Client,
    start: NaiveDate,
    end: NaiveDate,
    interval: String,
}

impl YahooFetcher {
    /// Create a new Yahoo Finance fetcher for a date range and interval
    pub fn new(start: NaiveDate, end: NaiveDate, interval: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(PriceHubError::RequestError)?;

        Ok(Self {
            client,
            start,
            end,
            interval: interval.to_string(),
        })
    }
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Convert a chart response into a raw table.
///
/// A chart-level error or a response with no rows yields an empty table,
/// which callers treat as the empty-result condition rather than a failure.
fn chart_to_raw(resp: ChartResponse) -> RawTable {
    if let Some(err) = resp.chart.error {
        warn!("Yahoo Finance error: {}: {}", err.code, err.description);
        return RawTable::empty();
    }

    let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return RawTable::empty();
    };
    let Some(timestamps) = data.timestamp else {
        return RawTable::empty();
    };
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return RawTable::empty();
    };
    // the adjusted series is not always present; fall back to the close
    let adjclose = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let n = timestamps.len();
    let mut index = Vec::with_capacity(n);
    let mut open = Vec::with_capacity(n);
    let mut high = Vec::with_capacity(n);
    let mut low = Vec::with_capacity(n);
    let mut close = Vec::with_capacity(n);
    let mut adj = Vec::with_capacity(n);
    let mut volume = Vec::with_capacity(n);

    for (i, &ts) in timestamps.iter().enumerate() {
        index.push(chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc()));
        open.push(at(&quote.open, i));
        high.push(at(&quote.high, i));
        low.push(at(&quote.low, i));
        close.push(at(&quote.close, i));
        adj.push(match &adjclose {
            Some(series) => at(series, i),
            None => at(&quote.close, i),
        });
        volume.push(at(&quote.volume, i));
    }

    RawTable::new(
        index,
        vec![
            RawColumn::new(ColumnLabel::single("Open"), open),
            RawColumn::new(ColumnLabel::single("High"), high),
            RawColumn::new(ColumnLabel::single("Low"), low),
            RawColumn::new(ColumnLabel::single("Close"), close),
            RawColumn::new(ColumnLabel::single("Adj Close"), adj),
            RawColumn::new(ColumnLabel::single("Volume"), volume),
        ],
    )
}

#[async_trait]
impl PriceFetcher for YahooFetcher {
    fn provider_name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &str) -> Result<RawTable> {
        info!(
            "Fetching Yahoo Finance data for {} from {} to {} [{}]",
            symbol, self.start, self.end, self.interval
        );

        let period1 = self.start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // inclusive through the end of the end date
        let period2 = self.end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_399;

        let response = self
            .client
            .get(format!(
                "https://query1.finance.yahoo.com/v8/finance/chart/{}",
                symbol
            ))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", self.interval.clone()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(PriceHubError::RequestError)?;

        let chart: ChartResponse = response.json().await?;
        let raw = chart_to_raw(chart);

        if raw.is_empty() {
            warn!("No data returned for {} from Yahoo Finance", symbol);
        } else {
            debug!("Fetched {} rows for {}", raw.len(), symbol);
        }

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CHART_JSON: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704067200, 1704153600],
                "indicators": {
                    "quote": [{
                        "open": [10.0, 11.0],
                        "high": [12.0, 13.0],
                        "low": [9.0, 10.0],
                        "close": [11.5, 12.5],
                        "volume": [1000.0, null]
                    }],
                    "adjclose": [{"adjclose": [11.0, 12.0]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_chart_response_into_raw_table() {
        let resp: ChartResponse = serde_json::from_str(CHART_JSON).unwrap();
        let raw = chart_to_raw(resp);

        assert_eq!(raw.len(), 2);
        assert_eq!(raw.columns.len(), 6);
        assert_eq!(
            raw.index[0],
            Some(
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        let adj = raw
            .columns
            .iter()
            .find(|c| c.label.flatten() == "Adj Close")
            .unwrap();
        assert_eq!(adj.values, vec![Some(11.0), Some(12.0)]);
        let volume = raw
            .columns
            .iter()
            .find(|c| c.label.flatten() == "Volume")
            .unwrap();
        assert_eq!(volume.values, vec![Some(1000.0), None]);
    }

    #[test]
    fn chart_error_yields_empty_table() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(chart_to_raw(resp).is_empty());
    }

    #[test]
    fn missing_adjclose_series_falls_back_to_close() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704067200],
                    "indicators": {
                        "quote": [{
                            "open": [1.0], "high": [2.0], "low": [0.5],
                            "close": [1.5], "volume": [10.0]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let raw = chart_to_raw(resp);
        let adj = raw
            .columns
            .iter()
            .find(|c| c.label.flatten() == "Adj Close")
            .unwrap();
        assert_eq!(adj.values, vec![Some(1.5)]);
    }
}
