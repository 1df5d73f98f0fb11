// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection seam between the save executor and a concrete store.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use orderly_core::{Order, OrderId};

use crate::error::StoreError;

/// One physical connection, used for exactly one save attempt.
///
/// Dropping a connection must release it. Dropping with a transaction still
/// open must leave no trace of that transaction in the store.
#[async_trait]
pub trait StoreConnection: Send {
    async fn open(&mut self) -> Result<(), StoreError>;

    async fn begin(&mut self) -> Result<(), StoreError>;

    /// Inserts `order` inside the open transaction with named parameters.
    async fn insert_order(&mut self, order: &Order) -> Result<OrderId, StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    async fn rollback(&mut self) -> Result<(), StoreError>;

    /// Closes the connection. Safe to call on a connection that never opened.
    async fn close(&mut self) -> Result<(), StoreError>;
}

/// Produces a fresh connection per save attempt.
///
/// `None` means the factory cannot produce a usable handle, which is a wiring
/// defect rather than a storage condition.
pub trait ConnectionFactory: Send + Sync + 'static {
    fn create_connection(&self) -> Option<Box<dyn StoreConnection>>;
}

/// Exclusive ownership of a connection for the duration of one attempt.
///
/// [`ConnectionScope::release`] closes it in an orderly way. If the scope is
/// dropped first (an error path that skipped release, or the attempt future
/// being cancelled), the connection is dropped with it.
pub(crate) struct ConnectionScope {
    conn: Option<Box<dyn StoreConnection>>,
}

impl ConnectionScope {
    pub(crate) fn new(conn: Box<dyn StoreConnection>) -> Self {
        Self { conn: Some(conn) }
    }

    pub(crate) fn conn(&mut self) -> Result<&mut (dyn StoreConnection + 'static), StoreError> {
        self.conn.as_deref_mut().ok_or(StoreError::NotOpen)
    }

    /// Closes the connection, waiting at most `limit`. Close failures and
    /// timeouts are logged, not returned; the handle is dropped either way.
    pub(crate) async fn release(mut self, limit: Duration) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        match tokio::time::timeout(limit, conn.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "connection close failed, handle dropped"),
            Err(_) => warn!(after = ?limit, "connection close timed out, handle dropped"),
        }
    }
}

impl Drop for ConnectionScope {
    fn drop(&mut self) {
        if self.conn.take().is_some() {
            debug!("save attempt abandoned, connection dropped");
        }
    }
}
