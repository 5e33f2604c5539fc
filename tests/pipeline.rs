use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use pricehub::config::{AssetType, FileFormat};
use pricehub::fetchers::base::PriceFetcher;
use pricehub::models::raw::{ColumnLabel, RawColumn, RawTable};
use pricehub::normalize::NormalizeMode;
use pricehub::services::pipeline::{PricePipeline, RunOutcome};
use pricehub::sinks::file::FileSink;
use pricehub::sinks::sqlite::SqliteSink;
use pricehub::Result;

struct StubFetcher {
    raw: RawTable,
}

#[async_trait]
impl PriceFetcher for StubFetcher {
    fn provider_name(&self) -> &'static str {
        "stub"
    }

    async fn fetch(&self, _symbol: &str) -> Result<RawTable> {
        Ok(self.raw.clone())
    }
}

fn raw_days(closes: &[Option<f64>]) -> RawTable {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let n = closes.len();
    let index = (0..n)
        .map(|i| Some(base + chrono::Duration::days(i as i64)))
        .collect();
    let filled = |v: f64| vec![Some(v); n];
    RawTable::new(
        index,
        vec![
            RawColumn::new(ColumnLabel::single("Open"), filled(1.0)),
            RawColumn::new(ColumnLabel::single("High"), filled(2.0)),
            RawColumn::new(ColumnLabel::single("Low"), filled(0.5)),
            RawColumn::new(ColumnLabel::single("Close"), closes.to_vec()),
            RawColumn::new(ColumnLabel::single("Adj Close"), filled(1.5)),
            RawColumn::new(ColumnLabel::single("Volume"), vec![None; n]),
        ],
    )
}

fn file_pipeline(raw: RawTable, dir: &TempDir) -> PricePipeline {
    PricePipeline::new(
        Arc::new(StubFetcher { raw }),
        Arc::new(FileSink::new(
            dir.path().to_str().unwrap(),
            AssetType::Equities,
            FileFormat::Csv,
        )),
        NormalizeMode::FlatFile,
    )
}

#[tokio::test]
async fn empty_fetch_creates_no_file() {
    let tmp = TempDir::new().unwrap();
    let pipeline = file_pipeline(RawTable::empty(), &tmp);

    let outcome = pipeline.run("AAPL").await.unwrap();

    assert_eq!(outcome, RunOutcome::Skipped);
    // the sink was never invoked, so not even the asset folder exists
    assert!(!tmp.path().join("equities").exists());
}

#[tokio::test]
async fn fetch_to_csv_drops_incomplete_rows() {
    let tmp = TempDir::new().unwrap();
    let pipeline = file_pipeline(raw_days(&[Some(10.0), None, Some(12.0)]), &tmp);

    let outcome = pipeline.run("AAPL").await.unwrap();

    assert_eq!(outcome, RunOutcome::Written { rows: 2 });
    let contents = std::fs::read_to_string(tmp.path().join("equities").join("AAPL.csv")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "Symbol,Date,Open,High,Low,Close,Adj Close,Volume"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("AAPL,2024-01-01 00:00:00"));
    assert!(lines[2].starts_with("AAPL,2024-01-03 00:00:00"));
}

#[tokio::test]
async fn second_run_overwrites_the_destination() {
    let tmp = TempDir::new().unwrap();

    file_pipeline(raw_days(&[Some(1.0), Some(2.0)]), &tmp)
        .run("AAPL")
        .await
        .unwrap();
    file_pipeline(raw_days(&[Some(42.0)]), &tmp)
        .run("AAPL")
        .await
        .unwrap();

    let contents = std::fs::read_to_string(tmp.path().join("equities").join("AAPL.csv")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("42"));
}

#[tokio::test]
async fn fetch_to_sqlite_replaces_the_prices_table() {
    use sqlx::{ConnectOptions, Connection, Row};

    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("prices.db");
    let sink = Arc::new(SqliteSink::new(db_path.to_str().unwrap()));

    let first = PricePipeline::new(
        Arc::new(StubFetcher {
            raw: raw_days(&[Some(1.0), Some(2.0), Some(3.0)]),
        }),
        sink.clone(),
        NormalizeMode::Database,
    );
    first.run("bitcoin").await.unwrap();

    let second = PricePipeline::new(
        Arc::new(StubFetcher {
            raw: raw_days(&[Some(99.0)]),
        }),
        sink,
        NormalizeMode::Database,
    );
    second.run("bitcoin").await.unwrap();

    let mut conn = sqlx::sqlite::SqliteConnectOptions::new()
        .filename(&db_path)
        .connect()
        .await
        .unwrap();
    let row = sqlx::query("SELECT COUNT(*), MAX(close), MIN(symbol) FROM prices")
        .fetch_one(&mut conn)
        .await
        .unwrap();
    assert_eq!(row.get::<i64, _>(0), 1);
    assert_eq!(row.get::<f64, _>(1), 99.0);
    assert_eq!(row.get::<String, _>(2), "bitcoin");
    conn.close().await.unwrap();
}
