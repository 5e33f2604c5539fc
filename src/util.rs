use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::Result;

/// Parse a YYYY-MM-DD date string.
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

/// Render a timestamp the way the sinks store it.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

// Arrow conversion utilities
pub mod arrow_utils {
    use super::*;
    use crate::errors::PriceHubError;
    use crate::models::price::{PriceRow, PriceTable};
    use arrow::array::{ArrayRef, StringBuilder};
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
    use arrow::ipc::reader::FileReader;
    use arrow::ipc::writer::FileWriter;
    use arrow::record_batch::RecordBatch;
    use arrow_array::{Array, Float64Array, TimestampMillisecondArray};
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;

    // Convert a canonical price table into a flat record batch. Field names
    // come from the table's headers so the file reflects the pipeline's
    // naming convention.
    pub fn price_table_to_record_batch(table: &PriceTable) -> Result<RecordBatch> {
        if table.headers.len() != 8 {
            return Err(PriceHubError::DataError(format!(
                "Expected 8 column names, got {}",
                table.headers.len()
            )));
        }

        let mut symbol_builder = StringBuilder::new();
        let mut date_values = Vec::with_capacity(table.len());
        let mut open_values = Vec::with_capacity(table.len());
        let mut high_values = Vec::with_capacity(table.len());
        let mut low_values = Vec::with_capacity(table.len());
        let mut close_values = Vec::with_capacity(table.len());
        let mut adj_close_values = Vec::with_capacity(table.len());
        let mut volume_values = Vec::with_capacity(table.len());

        for row in &table.rows {
            symbol_builder.append_value(&table.symbol);
            date_values.push(row.date.and_utc().timestamp_millis());
            open_values.push(row.open);
            high_values.push(row.high);
            low_values.push(row.low);
            close_values.push(row.close);
            adj_close_values.push(row.adj_close);
            volume_values.push(row.volume);
        }

        let schema = Schema::new(vec![
            Field::new(&table.headers[0], DataType::Utf8, false),
            Field::new(
                &table.headers[1],
                DataType::Timestamp(TimeUnit::Millisecond, None),
                false,
            ),
            Field::new(&table.headers[2], DataType::Float64, false),
            Field::new(&table.headers[3], DataType::Float64, false),
            Field::new(&table.headers[4], DataType::Float64, false),
            Field::new(&table.headers[5], DataType::Float64, false),
            Field::new(&table.headers[6], DataType::Float64, false),
            Field::new(&table.headers[7], DataType::Float64, true),
        ]);

        let symbol_array: ArrayRef = Arc::new(symbol_builder.finish());
        let date_array: ArrayRef = Arc::new(TimestampMillisecondArray::from(date_values));
        let open_array: ArrayRef = Arc::new(Float64Array::from(open_values));
        let high_array: ArrayRef = Arc::new(Float64Array::from(high_values));
        let low_array: ArrayRef = Arc::new(Float64Array::from(low_values));
        let close_array: ArrayRef = Arc::new(Float64Array::from(close_values));
        let adj_close_array: ArrayRef = Arc::new(Float64Array::from(adj_close_values));
        let volume_array: ArrayRef = Arc::new(Float64Array::from(volume_values));

        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                symbol_array,
                date_array,
                open_array,
                high_array,
                low_array,
                close_array,
                adj_close_array,
                volume_array,
            ],
        )
        .map_err(|e| PriceHubError::ArrowError(e.to_string()))
    }

    /// Write a price table to an Arrow IPC file, replacing any existing file.
    pub fn write_price_table_to_arrow(table: &PriceTable, path: &Path) -> Result<()> {
        let batch = price_table_to_record_batch(table)?;
        let file = File::create(path)?;

        let mut writer = FileWriter::try_new(file, &batch.schema())
            .map_err(|e| PriceHubError::ArrowError(e.to_string()))?;

        writer
            .write(&batch)
            .map_err(|e| PriceHubError::ArrowError(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| PriceHubError::ArrowError(e.to_string()))?;

        Ok(())
    }

    fn float_column(batch: &RecordBatch, idx: usize) -> Result<&Float64Array> {
        batch
            .column(idx)
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| PriceHubError::ArrowError(format!("Failed to downcast column {}", idx)))
    }

    /// Read price rows back from an Arrow IPC file.
    pub fn read_price_rows_from_arrow(path: &Path) -> Result<Vec<PriceRow>> {
        let file = File::open(path)?;
        let reader = FileReader::try_new(file, None)
            .map_err(|e| PriceHubError::ArrowError(e.to_string()))?;

        let mut rows = Vec::new();

        for batch in reader {
            let batch = batch.map_err(|e| PriceHubError::ArrowError(e.to_string()))?;

            let dates = batch
                .column(1)
                .as_any()
                .downcast_ref::<TimestampMillisecondArray>()
                .ok_or_else(|| {
                    PriceHubError::ArrowError("Failed to downcast date column".to_string())
                })?;
            let open = float_column(&batch, 2)?;
            let high = float_column(&batch, 3)?;
            let low = float_column(&batch, 4)?;
            let close = float_column(&batch, 5)?;
            let adj_close = float_column(&batch, 6)?;
            let volume = float_column(&batch, 7)?;

            for i in 0..batch.num_rows() {
                let date = chrono::DateTime::from_timestamp_millis(dates.value(i))
                    .map(|dt| dt.naive_utc())
                    .ok_or_else(|| {
                        PriceHubError::ArrowError(format!("Invalid timestamp: {}", dates.value(i)))
                    })?;

                rows.push(PriceRow {
                    date,
                    open: open.value(i),
                    high: high.value(i),
                    low: low.value(i),
                    close: close.value(i),
                    adj_close: adj_close.value(i),
                    volume: if volume.is_null(i) {
                        None
                    } else {
                        Some(volume.value(i))
                    },
                });
            }
        }

        Ok(rows)
    }
}
