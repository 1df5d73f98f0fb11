// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite connections over `tokio-rusqlite`.
//!
//! Each [`SqliteConnection`] owns its own background thread for the length of
//! one save attempt. Dropping the handle stops the thread and closes the
//! database, which rolls back any transaction left open.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::named_params;
use tracing::debug;

use orderly_core::{Order, OrderId};

use crate::connection::{ConnectionFactory, StoreConnection};
use crate::error::{Operation, StoreError};

const INSERT_ORDER: &str = "INSERT INTO Orders (CustomerName, ProductName, Quantity, Price) \
     VALUES (:customer_name, :product_name, :quantity, :price)";

/// Location of the SQLite database, parsed from a connection string.
///
/// Accepts `Data Source=<path>` with optional extra `;Key=Value` pairs, or a
/// bare path. In-memory databases are rejected: every save attempt opens a
/// new connection, and an in-memory database dies with its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    path: PathBuf,
}

impl DataSource {
    pub fn parse(connection_string: &str) -> Result<Self, StoreError> {
        let raw = connection_string.trim();
        if raw.is_empty() {
            return Err(StoreError::Configuration(
                "connection string is empty".to_string(),
            ));
        }

        let path = if raw.contains('=') {
            let mut path = None;
            for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                let Some((key, value)) = pair.split_once('=') else {
                    return Err(StoreError::Configuration(format!(
                        "malformed connection string segment `{pair}`"
                    )));
                };
                let key = key.trim().to_ascii_lowercase();
                let value = value.trim();
                match key.as_str() {
                    "data source" | "datasource" | "filename" => path = Some(value.to_string()),
                    "mode" if value.eq_ignore_ascii_case("memory") => {
                        return Err(in_memory_rejected());
                    }
                    _ => {}
                }
            }
            path.ok_or_else(|| {
                StoreError::Configuration("connection string has no `Data Source`".to_string())
            })?
        } else {
            raw.to_string()
        };

        if path.is_empty() {
            return Err(StoreError::Configuration(
                "connection string has an empty `Data Source`".to_string(),
            ));
        }
        if path == ":memory:" {
            return Err(in_memory_rejected());
        }

        Ok(Self {
            path: PathBuf::from(path),
        })
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn in_memory_rejected() -> StoreError {
    StoreError::Configuration(
        "in-memory databases do not survive between save attempts; use a file path".to_string(),
    )
}

/// Creates one [`SqliteConnection`] per save attempt.
#[derive(Debug, Clone)]
pub struct SqliteConnectionFactory {
    source: DataSource,
    busy_timeout: Duration,
}

impl SqliteConnectionFactory {
    pub fn new(source: DataSource, busy_timeout: Duration) -> Self {
        Self {
            source,
            busy_timeout,
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    fn create_connection(&self) -> Option<Box<dyn StoreConnection>> {
        Some(Box::new(SqliteConnection::new(
            self.source.path().to_path_buf(),
            self.busy_timeout,
        )))
    }
}

/// A single-attempt SQLite connection.
pub struct SqliteConnection {
    path: PathBuf,
    busy_timeout: Duration,
    conn: Option<tokio_rusqlite::Connection>,
}

impl SqliteConnection {
    pub fn new(path: PathBuf, busy_timeout: Duration) -> Self {
        Self {
            path,
            busy_timeout,
            conn: None,
        }
    }

    fn handle(&self) -> Result<&tokio_rusqlite::Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::NotOpen)
    }

    async fn exec(&self, operation: Operation, sql: &'static str) -> Result<(), StoreError> {
        self.handle()?
            .call(move |conn| -> rusqlite::Result<()> { conn.execute_batch(sql) })
            .await
            .map_err(|e| StoreError::from_driver(operation, e))
    }
}

#[async_trait]
impl StoreConnection for SqliteConnection {
    async fn open(&mut self) -> Result<(), StoreError> {
        let conn = tokio_rusqlite::Connection::open(&self.path)
            .await
            .map_err(|e| StoreError::Open {
                path: self.path.display().to_string(),
                source: Box::new(e),
            })?;

        let busy_timeout = self.busy_timeout;
        conn.call(move |conn| -> rusqlite::Result<()> { conn.busy_timeout(busy_timeout) })
            .await
            .map_err(|e| StoreError::from_driver(Operation::Open, e))?;

        debug!(path = %self.path.display(), "sqlite connection opened");
        self.conn = Some(conn);
        Ok(())
    }

    async fn begin(&mut self) -> Result<(), StoreError> {
        // IMMEDIATE takes the write lock now, so contention surfaces as
        // SQLITE_BUSY here instead of midway through the insert.
        self.exec(Operation::Begin, "BEGIN IMMEDIATE").await
    }

    async fn insert_order(&mut self, order: &Order) -> Result<OrderId, StoreError> {
        let customer_name = order.customer_name.clone();
        let product_name = order.product_name.clone();
        let quantity = order.quantity;
        let price = order.price;

        let id = self
            .handle()?
            .call(move |conn| -> rusqlite::Result<i64> {
                conn.execute(
                    INSERT_ORDER,
                    named_params! {
                        ":customer_name": customer_name,
                        ":product_name": product_name,
                        ":quantity": quantity,
                        ":price": price,
                    },
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| StoreError::from_driver(Operation::Insert, e))?;

        Ok(OrderId(id))
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.exec(Operation::Commit, "COMMIT").await
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.exec(Operation::Rollback, "ROLLBACK").await
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        conn.close().await.map_err(|e| StoreError::Driver {
            operation: Operation::Close,
            message: e.to_string(),
        })
    }
}
