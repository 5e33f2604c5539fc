use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::{PriceHubError, Result};
use crate::fetchers::base::PriceFetcher;
use crate::models::raw::{ColumnLabel, RawColumn, RawTable};

/// CoinGecko market-chart response. Only the close-price series is used;
/// the endpoint has no OHLCV bars.
#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

/// Crypto price fetcher backed by the CoinGecko market-chart API
pub struct CoinGeckoFetcher {
    client: Client,
    vs_currency: String,
    days: String,
}

impl CoinGeckoFetcher {
    /// Create a new CoinGecko fetcher for a quote currency and lookback window
    pub fn new(vs_currency: &str, days: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(PriceHubError::RequestError)?;

        Ok(Self {
            client,
            vs_currency: vs_currency.to_string(),
            days: days.to_string(),
        })
    }
}

/// Synthesize a raw OHLCV table from the close-price series.
///
/// The market-chart endpoint exposes only (timestamp, price) pairs; there is
/// no full OHLCV for this provider. Open/High/Low/Adj Close deliberately
/// repeat the close and volume stays absent.
fn market_chart_to_raw(chart: MarketChart) -> RawTable {
    let n = chart.prices.len();
    let mut index = Vec::with_capacity(n);
    let mut price = Vec::with_capacity(n);

    for (ts_ms, value) in chart.prices {
        index.push(chrono::DateTime::from_timestamp_millis(ts_ms as i64).map(|dt| dt.naive_utc()));
        price.push(Some(value));
    }

    RawTable::new(
        index,
        vec![
            RawColumn::new(ColumnLabel::single("Open"), price.clone()),
            RawColumn::new(ColumnLabel::single("High"), price.clone()),
            RawColumn::new(ColumnLabel::single("Low"), price.clone()),
            RawColumn::new(ColumnLabel::single("Close"), price.clone()),
            RawColumn::new(ColumnLabel::single("Adj Close"), price),
            RawColumn::new(ColumnLabel::single("Volume"), vec![None; n]),
        ],
    )
}

#[async_trait]
impl PriceFetcher for CoinGeckoFetcher {
    fn provider_name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch(&self, symbol: &str) -> Result<RawTable> {
        // coin ids are lower-case on CoinGecko
        let coin_id = symbol.to_lowercase();
        info!(
            "Fetching CoinGecko data for {} vs {} for last {} days",
            coin_id, self.vs_currency, self.days
        );

        let response = self
            .client
            .get(format!(
                "https://api.coingecko.com/api/v3/coins/{}/market_chart",
                coin_id
            ))
            .query(&[
                ("vs_currency", self.vs_currency.as_str()),
                ("days", self.days.as_str()),
            ])
            .send()
            .await
            .map_err(PriceHubError::RequestError)?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("CoinGecko API error: {}", body);
            return Ok(RawTable::empty());
        }

        let chart: MarketChart = response.json().await?;
        let raw = market_chart_to_raw(chart);
        debug!("Fetched {} price points for {}", raw.len(), coin_id);

        Ok(raw)
    }
}
