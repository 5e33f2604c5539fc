use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use log::info;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};

use crate::errors::{PriceHubError, Result};
use crate::models::price::PriceTable;
use crate::sinks::base::PriceSink;
use crate::util::format_datetime;

/// The one table this sink maintains.
const TABLE_NAME: &str = "prices";

/// SQLite sink: a single-file database with one replaceable table.
///
/// Each write opens its own connection, drops and recreates the table
/// (destructive overwrite, not append), and closes the connection.
pub struct SqliteSink {
    db_path: PathBuf,
}

impl SqliteSink {
    pub fn new(db_path: &str) -> Self {
        Self {
            db_path: PathBuf::from(db_path),
        }
    }
}

#[async_trait]
impl PriceSink for SqliteSink {
    fn describe(&self) -> String {
        format!("table '{}' in {}", TABLE_NAME, self.db_path.display())
    }

    async fn write(&self, table: &PriceTable) -> Result<()> {
        if table.headers.len() != 8 {
            return Err(PriceHubError::DataError(format!(
                "Expected 8 column names, got {}",
                table.headers.len()
            )));
        }

        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut conn: SqliteConnection = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true)
            .connect()
            .await?;

        // replace previous contents for the table, never append
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", TABLE_NAME))
            .execute(&mut conn)
            .await?;

        let create = format!(
            "CREATE TABLE {} (\
             \"{}\" TEXT NOT NULL, \
             \"{}\" TEXT NOT NULL, \
             \"{}\" REAL NOT NULL, \
             \"{}\" REAL NOT NULL, \
             \"{}\" REAL NOT NULL, \
             \"{}\" REAL NOT NULL, \
             \"{}\" REAL NOT NULL, \
             \"{}\" REAL)",
            TABLE_NAME,
            table.headers[0],
            table.headers[1],
            table.headers[2],
            table.headers[3],
            table.headers[4],
            table.headers[5],
            table.headers[6],
            table.headers[7],
        );
        sqlx::query(&create).execute(&mut conn).await?;

        let insert = format!(
            "INSERT INTO {} VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            TABLE_NAME
        );
        for row in &table.rows {
            sqlx::query(&insert)
                .bind(table.symbol.as_str())
                .bind(format_datetime(&row.date))
                .bind(row.open)
                .bind(row.high)
                .bind(row.low)
                .bind(row.close)
                .bind(row.adj_close)
                .bind(row.volume)
                .execute(&mut conn)
                .await?;
        }

        // connection is scoped to this write; close it explicitly
        conn.close().await?;

        info!(
            "Data saved to table '{}' in {}",
            TABLE_NAME,
            self.db_path.display()
        );
        Ok(())
    }
}
