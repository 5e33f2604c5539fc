use chrono::NaiveDateTime;

/// One canonical price bar.
///
/// Volume is optional: some sources (CoinGecko market charts) publish only a
/// close-price series, so a missing volume does not invalidate the row.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: Option<f64>,
}

/// Canonical price table for a single symbol.
///
/// Invariants established by normalization: rows are ordered by date
/// ascending, dates are unique, and every row has all required price fields.
/// `headers` holds the persisted column names in order, symbol column first;
/// the two persistence families disagree on the naming convention, so the
/// names travel with the table instead of living in the sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub symbol: String,
    pub headers: Vec<String>,
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
