use crate::errors::Result;
use crate::models::price::PriceTable;
use async_trait::async_trait;

/// Base trait for price table sinks
#[async_trait]
pub trait PriceSink {
    /// Human-readable destination, for log lines
    fn describe(&self) -> String;

    /// Durably store the table, replacing any previous contents for the
    /// same destination. Exactly one write per invocation; no coordination.
    async fn write(&self, table: &PriceTable) -> Result<()>;
}
