use std::sync::Arc;

use log::{info, warn};

use crate::errors::Result;
use crate::fetchers::base::PriceFetcher;
use crate::normalize::{normalize_for_database, normalize_for_files, NormalizeMode};
use crate::sinks::base::PriceSink;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The provider returned no rows; nothing was normalized or persisted.
    Skipped,
    /// The canonical table was handed to the sink.
    Written { rows: usize },
}

/// Wires one fetcher, one normalization variant and one sink together.
///
/// Control flow is strictly linear: fetch once, normalize, persist, for one
/// symbol per invocation. No state is retained across runs.
pub struct PricePipeline {
    fetcher: Arc<dyn PriceFetcher + Send + Sync>,
    sink: Arc<dyn PriceSink + Send + Sync>,
    mode: NormalizeMode,
}

impl PricePipeline {
    pub fn new(
        fetcher: Arc<dyn PriceFetcher + Send + Sync>,
        sink: Arc<dyn PriceSink + Send + Sync>,
        mode: NormalizeMode,
    ) -> Self {
        Self {
            fetcher,
            sink,
            mode,
        }
    }

    /// Run the pipeline for a single symbol.
    pub async fn run(&self, symbol: &str) -> Result<RunOutcome> {
        let raw = self.fetcher.fetch(symbol).await?;

        if raw.is_empty() {
            warn!(
                "Nothing to persist for {} from {}",
                symbol,
                self.fetcher.provider_name()
            );
            return Ok(RunOutcome::Skipped);
        }

        let table = match self.mode {
            NormalizeMode::FlatFile => normalize_for_files(&raw, symbol),
            NormalizeMode::Database => normalize_for_database(&raw, symbol),
        };

        self.sink.write(&table).await?;
        info!(
            "Stored {} rows for {} to {}",
            table.len(),
            symbol,
            self.sink.describe()
        );

        Ok(RunOutcome::Written { rows: table.len() })
    }
}
