use chrono::NaiveDateTime;

/// Column label on a raw table.
///
/// Most sources label columns with a single name ("Close"). Some group their
/// headers, e.g. price field over ticker, which arrives here as a composite
/// label; normalization flattens those before matching fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel {
    pub parts: Vec<String>,
}

impl ColumnLabel {
    pub fn single(name: &str) -> Self {
        Self {
            parts: vec![name.to_string()],
        }
    }

    pub fn composite(parts: &[&str]) -> Self {
        Self {
            parts: parts.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Join the non-empty parts with an underscore.
    pub fn flatten(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// One named column of a raw table. Missing cells stay `None` until
/// normalization drops the incomplete rows.
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub label: ColumnLabel,
    pub values: Vec<Option<f64>>,
}

impl RawColumn {
    pub fn new(label: ColumnLabel, values: Vec<Option<f64>>) -> Self {
        Self { label, values }
    }
}

/// Time-indexed table as returned by a fetcher, before normalization.
///
/// The index carries the row timestamps; an empty index is the non-fatal
/// "provider returned nothing" signal and callers skip all downstream steps.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub index: Vec<Option<NaiveDateTime>>,
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new(index: Vec<Option<NaiveDateTime>>, columns: Vec<RawColumn>) -> Self {
        Self { index, columns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_joins_non_empty_parts() {
        assert_eq!(ColumnLabel::single("Close").flatten(), "Close");
        assert_eq!(
            ColumnLabel::composite(&["Adj Close", "BTC"]).flatten(),
            "Adj Close_BTC"
        );
        assert_eq!(ColumnLabel::composite(&["Open", ""]).flatten(), "Open");
    }

    #[test]
    fn empty_table_reports_empty() {
        assert!(RawTable::empty().is_empty());
        assert_eq!(RawTable::empty().len(), 0);
    }
}
