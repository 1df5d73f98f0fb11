// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side queries over stored orders.

pub mod orders;

use crate::error::StoreError;
use crate::sqlite::DataSource;

/// Opens a short-lived connection for schema work and reads.
pub(crate) async fn connect(source: &DataSource) -> Result<tokio_rusqlite::Connection, StoreError> {
    tokio_rusqlite::Connection::open(source.path())
        .await
        .map_err(|e| StoreError::Open {
            path: source.path().display().to_string(),
            source: Box::new(e),
        })
}
