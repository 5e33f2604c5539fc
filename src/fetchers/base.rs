use crate::errors::Result;
use crate::models::raw::RawTable;
use async_trait::async_trait;

/// Base trait for price data fetchers
#[async_trait]
pub trait PriceFetcher {
    /// Get the provider name this fetcher is for
    fn provider_name(&self) -> &'static str;

    /// Fetch a raw price table for a symbol.
    ///
    /// An empty table means the provider returned no rows; that is not an
    /// error and the caller must skip normalization and persistence.
    async fn fetch(&self, symbol: &str) -> Result<RawTable>;
}
