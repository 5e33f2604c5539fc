use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::info;

use crate::config::{AssetType, FileFormat};
use crate::errors::Result;
use crate::models::price::PriceTable;
use crate::sinks::base::PriceSink;
use crate::util::{arrow_utils, format_datetime};

/// File sink: writes one file per symbol under `<output_dir>/<asset_type>/`,
/// overwriting any existing file at that path.
pub struct FileSink {
    output_dir: PathBuf,
    asset_type: AssetType,
    format: FileFormat,
}

impl FileSink {
    pub fn new(output_dir: &str, asset_type: AssetType, format: FileFormat) -> Self {
        Self {
            output_dir: PathBuf::from(output_dir),
            asset_type,
            format,
        }
    }
}

fn write_csv(table: &PriceTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;

    for row in &table.rows {
        writer.write_record(&[
            table.symbol.clone(),
            format_datetime(&row.date),
            row.open.to_string(),
            row.high.to_string(),
            row.low.to_string(),
            row.close.to_string(),
            row.adj_close.to_string(),
            // absent volume stays an empty field
            row.volume.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[async_trait]
impl PriceSink for FileSink {
    fn describe(&self) -> String {
        format!(
            "{} files under {}",
            self.format.extension(),
            self.output_dir.join(self.asset_type.as_str()).display()
        )
    }

    async fn write(&self, table: &PriceTable) -> Result<()> {
        let folder = self.output_dir.join(self.asset_type.as_str());
        fs::create_dir_all(&folder)?;

        let file_path = folder.join(format!("{}.{}", table.symbol, self.format.extension()));

        match self.format {
            FileFormat::Csv => write_csv(table, &file_path)?,
            FileFormat::Arrow => arrow_utils::write_price_table_to_arrow(table, &file_path)?,
        }

        info!("Data saved to {}", file_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::PriceRow;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn table_with_closes(symbol: &str, closes: &[f64]) -> PriceTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        PriceTable {
            symbol: symbol.to_string(),
            headers: ["Symbol", "Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows: closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PriceRow {
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    adj_close: close,
                    volume: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn writes_csv_under_asset_type_folder() {
        let tmp = TempDir::new().unwrap();
        let sink = FileSink::new(
            tmp.path().to_str().unwrap(),
            AssetType::Equities,
            FileFormat::Csv,
        );

        sink.write(&table_with_closes("AAPL", &[10.0])).await.unwrap();

        let path = tmp.path().join("equities").join("AAPL.csv");
        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Symbol,Date,Open,High,Low,Close,Adj Close,Volume"
        );
        // absent volume serializes as an empty trailing field
        assert_eq!(lines.next().unwrap(), "AAPL,2024-01-01 00:00:00,10,10,10,10,10,");
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn second_write_overwrites_first() {
        let tmp = TempDir::new().unwrap();
        let sink = FileSink::new(
            tmp.path().to_str().unwrap(),
            AssetType::Crypto,
            FileFormat::Csv,
        );

        sink.write(&table_with_closes("BTC", &[1.0, 2.0, 3.0]))
            .await
            .unwrap();
        sink.write(&table_with_closes("BTC", &[42.0])).await.unwrap();

        let contents = fs::read_to_string(tmp.path().join("crypto").join("BTC.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("42"));
    }

    #[tokio::test]
    async fn arrow_format_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let sink = FileSink::new(
            tmp.path().to_str().unwrap(),
            AssetType::Fx,
            FileFormat::Arrow,
        );
        let table = table_with_closes("EURUSD=X", &[1.1, 1.2]);

        sink.write(&table).await.unwrap();

        let path = tmp.path().join("fx").join("EURUSD=X.arrow");
        let rows = arrow_utils::read_price_rows_from_arrow(&path).unwrap();
        assert_eq!(rows, table.rows);
    }
}
