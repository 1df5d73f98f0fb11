// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `Orders` table bootstrap.
//!
//! Idempotent create only; there are no versioned migrations.

use tracing::debug;

use orderly_config::StorageConfig;
use orderly_core::OrderError;

use crate::error::{Operation, StoreError};
use crate::provider::{Provider, configuration};
use crate::queries::connect;
use crate::sqlite::DataSource;

/// DDL for the `Orders` table.
pub const CREATE_ORDERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS Orders (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    CustomerName TEXT NOT NULL,
    ProductName TEXT NOT NULL,
    Quantity INTEGER NOT NULL CHECK (Quantity >= 0),
    Price REAL NOT NULL
);";

/// Creates the `Orders` table if it does not exist yet.
pub async fn ensure_schema(source: &DataSource) -> Result<(), StoreError> {
    let conn = connect(source).await?;
    conn.call(|conn| -> rusqlite::Result<()> { conn.execute_batch(CREATE_ORDERS_TABLE) })
        .await
        .map_err(|e| StoreError::from_driver(Operation::Schema, e))?;
    debug!(path = %source.path().display(), "orders schema ready");
    Ok(())
}

/// Resolves the configured store and makes sure its schema exists.
///
/// Returns the data source for read-side queries.
pub async fn prepare_store(storage: &StorageConfig) -> Result<DataSource, OrderError> {
    let provider = Provider::parse(&storage.provider)?;
    let source = match provider {
        Provider::Sqlite => DataSource::parse(&storage.connection_string).map_err(configuration)?,
    };
    ensure_schema(&source)
        .await
        .map_err(|e| OrderError::FatalStorage {
            source: Box::new(e),
        })?;
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let source = DataSource::from_path(dir.path().join("orders.db"));

        ensure_schema(&source).await.unwrap();
        ensure_schema(&source).await.unwrap();

        assert!(source.path().exists());
        assert_eq!(crate::queries::orders::count_orders(&source).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn prepare_store_creates_schema_from_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prepared.db");
        let storage = StorageConfig {
            connection_string: format!("Data Source={}", path.display()),
            ..StorageConfig::default()
        };

        let source = prepare_store(&storage).await.unwrap();
        assert_eq!(source.path(), path.as_path());
        assert_eq!(crate::queries::orders::count_orders(&source).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn prepare_store_rejects_in_memory() {
        let storage = StorageConfig {
            connection_string: ":memory:".to_string(),
            ..StorageConfig::default()
        };
        assert!(matches!(
            prepare_store(&storage).await,
            Err(OrderError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn missing_directory_fails_to_open() {
        let dir = tempdir().unwrap();
        let source = DataSource::from_path(dir.path().join("no/such/dir/orders.db"));

        let err = ensure_schema(&source).await.unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }), "{err:?}");
    }
}
