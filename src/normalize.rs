use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::models::price::{PriceRow, PriceTable};
use crate::models::raw::RawTable;

/// Persisted column names in canonical order, symbol column first.
const CANONICAL_HEADERS: [&str; 8] = [
    "Symbol",
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Adj Close",
    "Volume",
];

/// Which normalization/persistence pairing a pipeline runs.
///
/// The two variants are intentionally kept separate: the flat-file pipeline
/// keeps the capitalized column names, the database pipeline snake-cases
/// them, and they collapse duplicate timestamps at different points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    FlatFile,
    Database,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriceField {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

/// Lower-case a column name and replace spaces with underscores.
fn snake_case(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Identify the price field a flattened column name refers to.
///
/// Matches on the leading field token so grouped headers that flattened to
/// e.g. "Adj Close_BTC" still resolve. "adjclose" is accepted as a spelling
/// of the adjusted close.
fn recognize(flat_name: &str) -> Option<PriceField> {
    const FIELDS: [(&str, PriceField); 7] = [
        ("adj_close", PriceField::AdjClose),
        ("adjclose", PriceField::AdjClose),
        ("open", PriceField::Open),
        ("high", PriceField::High),
        ("low", PriceField::Low),
        ("close", PriceField::Close),
        ("volume", PriceField::Volume),
    ];
    let key = snake_case(flat_name);
    for (token, field) in FIELDS {
        if key == token || key.starts_with(&format!("{}_", token)) {
            return Some(field);
        }
    }
    None
}

#[derive(Default)]
struct FieldColumns<'a> {
    open: Option<&'a [Option<f64>]>,
    high: Option<&'a [Option<f64>]>,
    low: Option<&'a [Option<f64>]>,
    close: Option<&'a [Option<f64>]>,
    adj_close: Option<&'a [Option<f64>]>,
    volume: Option<&'a [Option<f64>]>,
}

fn map_fields<'a>(raw: &'a RawTable, names: &[String]) -> FieldColumns<'a> {
    let mut fields = FieldColumns::default();
    for (col, name) in raw.columns.iter().zip(names) {
        let slot = match recognize(name) {
            Some(PriceField::Open) => &mut fields.open,
            Some(PriceField::High) => &mut fields.high,
            Some(PriceField::Low) => &mut fields.low,
            Some(PriceField::Close) => &mut fields.close,
            Some(PriceField::AdjClose) => &mut fields.adj_close,
            Some(PriceField::Volume) => &mut fields.volume,
            None => continue,
        };
        // first matching column wins
        if slot.is_none() {
            *slot = Some(col.values.as_slice());
        }
    }
    fields
}

fn cell(col: Option<&[Option<f64>]>, i: usize) -> Option<f64> {
    col.and_then(|values| values.get(i).copied().flatten())
}

/// Build a complete row at index `i`, or `None` if any required price field
/// is missing. Absent volume does not disqualify the row.
fn build_row(fields: &FieldColumns, date: NaiveDateTime, i: usize) -> Option<PriceRow> {
    Some(PriceRow {
        date,
        open: cell(fields.open, i)?,
        high: cell(fields.high, i)?,
        low: cell(fields.low, i)?,
        close: cell(fields.close, i)?,
        adj_close: cell(fields.adj_close, i)?,
        volume: cell(fields.volume, i),
    })
}

/// Normalize a raw table for the flat-file pipeline.
///
/// Keeps the capitalized column names ("Open", "Adj Close", ...). Duplicate
/// timestamps are collapsed on the index, before it is promoted to the Date
/// column.
pub fn normalize_for_files(raw: &RawTable, symbol: &str) -> PriceTable {
    // flatten grouped headers, then locate the price fields
    let names: Vec<String> = raw.columns.iter().map(|c| c.label.flatten()).collect();
    let fields = map_fields(raw, &names);

    // drop rows missing the timestamp or a required price field
    let mut indexed: Vec<(NaiveDateTime, PriceRow)> = Vec::new();
    for i in 0..raw.len() {
        let Some(date) = raw.index.get(i).copied().flatten() else {
            continue;
        };
        if let Some(row) = build_row(&fields, date, i) {
            indexed.push((date, row));
        }
    }

    // collapse duplicate index timestamps, first occurrence wins
    let mut seen: HashSet<NaiveDateTime> = HashSet::new();
    indexed.retain(|(date, _)| seen.insert(*date));

    // promote the index to the Date column, ascending
    let mut rows: Vec<PriceRow> = indexed.into_iter().map(|(_, row)| row).collect();
    rows.sort_by_key(|r| r.date);

    PriceTable {
        symbol: symbol.to_string(),
        headers: CANONICAL_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

/// Normalize a raw table for the database pipeline.
///
/// Lower-cases column names and replaces spaces with underscores. The
/// timestamp is promoted to a date column first; duplicates are collapsed on
/// the materialized column.
pub fn normalize_for_database(raw: &RawTable, symbol: &str) -> PriceTable {
    // flatten grouped headers and snake-case the names before matching
    let names: Vec<String> = raw
        .columns
        .iter()
        .map(|c| snake_case(&c.label.flatten()))
        .collect();
    let fields = map_fields(raw, &names);

    // drop incomplete rows, promoting the timestamp into the row
    let mut rows: Vec<PriceRow> = Vec::new();
    for i in 0..raw.len() {
        let Some(date) = raw.index.get(i).copied().flatten() else {
            continue;
        };
        if let Some(row) = build_row(&fields, date, i) {
            rows.push(row);
        }
    }

    // collapse duplicate dates on the column, first occurrence wins
    let mut seen: HashSet<NaiveDateTime> = HashSet::new();
    rows.retain(|r| seen.insert(r.date));
    rows.sort_by_key(|r| r.date);

    PriceTable {
        symbol: symbol.to_string(),
        headers: CANONICAL_HEADERS.iter().map(|h| snake_case(h)).collect(),
        rows,
    }
}
