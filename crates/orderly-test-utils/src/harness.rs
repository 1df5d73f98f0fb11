// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary order store for integration tests.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use orderly_config::{RetryConfig, StorageConfig};
use orderly_storage::queries::orders::{StoredOrder, count_orders, list_orders};
use orderly_storage::schema::ensure_schema;
use orderly_storage::{ConnectionFactory, DataSource, SqliteOrderRepository, StoreError};

/// A file-backed SQLite database with the `Orders` table, deleted on drop.
pub struct TestStore {
    _dir: TempDir,
    source: DataSource,
}

impl TestStore {
    pub async fn new() -> Result<Self, StoreError> {
        let dir = TempDir::new().map_err(|e| StoreError::Open {
            path: "<tempdir>".to_string(),
            source: Box::new(e),
        })?;
        let source = DataSource::from_path(dir.path().join("orders.db"));
        ensure_schema(&source).await?;
        Ok(Self { _dir: dir, source })
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// `Data Source=<path>` for this store.
    pub fn connection_string(&self) -> String {
        format!("Data Source={}", self.source.path().display())
    }

    /// Storage settings pointing at this store, with short timeouts.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            connection_string: self.connection_string(),
            busy_timeout_ms: 200,
            operation_timeout_ms: 2_000,
            ..StorageConfig::default()
        }
    }

    /// A repository over `factory` with millisecond backoff.
    pub fn repository(
        &self,
        factory: Arc<dyn ConnectionFactory>,
        max_retries: u32,
        operation_timeout: Duration,
    ) -> SqliteOrderRepository {
        let storage = StorageConfig {
            operation_timeout_ms: operation_timeout.as_millis() as u64,
            ..self.storage_config()
        };
        let retry = RetryConfig {
            max_retries,
            base_delay_ms: 1,
        };
        SqliteOrderRepository::with_factory(factory, &storage, &retry)
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        count_orders(&self.source).await
    }

    pub async fn orders(&self) -> Result<Vec<StoredOrder>, StoreError> {
        list_orders(&self.source, None).await
    }
}
