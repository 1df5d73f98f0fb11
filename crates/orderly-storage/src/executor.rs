// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One save attempt as one transaction.
//!
//! The executor never retries and never classifies: whatever goes wrong is
//! returned raw to the caller's retry policy.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use orderly_core::{Order, OrderId};

use crate::connection::{ConnectionFactory, ConnectionScope, StoreConnection};
use crate::error::{Operation, StoreError};

/// How far the most recent attempt got toward committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CommitPhase {
    /// No commit issued, or the last one failed with a definite error.
    #[default]
    NotIssued,
    /// `COMMIT` handed to the driver, acknowledgement not yet seen.
    InFlight,
    Committed(OrderId),
}

/// Shared view of [`CommitPhase`] for a caller that may stop polling the
/// attempt before it finishes.
#[derive(Debug, Default)]
pub(crate) struct CommitTracker(Mutex<CommitPhase>);

impl CommitTracker {
    pub(crate) fn phase(&self) -> CommitPhase {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, phase: CommitPhase) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }
}

/// Runs a single transactional insert of an [`Order`].
///
/// After [`run`](Self::run) returns, either exactly one new row for the order
/// is committed or nothing is, and the connection has been released.
pub struct TransactionalSaveExecutor {
    factory: Arc<dyn ConnectionFactory>,
    operation_timeout: Duration,
}

impl TransactionalSaveExecutor {
    /// `operation_timeout` bounds each individual step, close included, not
    /// the attempt as a whole.
    pub fn new(factory: Arc<dyn ConnectionFactory>, operation_timeout: Duration) -> Self {
        Self {
            factory,
            operation_timeout,
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Acquires a connection, inserts `order` in a transaction, and releases
    /// the connection on every exit path.
    pub async fn run(&self, order: &Order) -> Result<OrderId, StoreError> {
        self.run_tracked(order, &CommitTracker::default()).await
    }

    /// As [`run`](Self::run), recording the commit phase in `tracker`.
    pub(crate) async fn run_tracked(
        &self,
        order: &Order,
        tracker: &CommitTracker,
    ) -> Result<OrderId, StoreError> {
        let conn = self.factory.create_connection().ok_or_else(|| {
            StoreError::Configuration("connection factory returned no usable connection".to_string())
        })?;

        let mut scope = ConnectionScope::new(conn);
        let result = self.save_in_transaction(scope.conn()?, order, tracker).await;
        scope.release(self.operation_timeout).await;
        result
    }

    async fn save_in_transaction(
        &self,
        conn: &mut dyn StoreConnection,
        order: &Order,
        tracker: &CommitTracker,
    ) -> Result<OrderId, StoreError> {
        self.step(Operation::Open, conn.open()).await?;
        self.step(Operation::Begin, conn.begin()).await?;

        match self.insert_and_commit(conn, order, tracker).await {
            Ok(id) => {
                info!(
                    order_id = id.0,
                    customer = %order.customer_name,
                    product = %order.product_name,
                    quantity = order.quantity,
                    "order committed"
                );
                Ok(id)
            }
            Err(e) => {
                match self.step(Operation::Rollback, conn.rollback()).await {
                    Ok(()) => debug!(error = %e, "transaction rolled back"),
                    Err(rollback_err) => warn!(
                        error = %e,
                        rollback_error = %rollback_err,
                        "rollback failed, connection will be discarded"
                    ),
                }
                Err(e)
            }
        }
    }

    async fn insert_and_commit(
        &self,
        conn: &mut dyn StoreConnection,
        order: &Order,
        tracker: &CommitTracker,
    ) -> Result<OrderId, StoreError> {
        let id = self.step(Operation::Insert, conn.insert_order(order)).await?;
        tracker.set(CommitPhase::InFlight);
        match self
            .step(Operation::Commit, conn.commit())
            .await
            .map_err(StoreError::settle_commit)
        {
            Ok(()) => {
                tracker.set(CommitPhase::Committed(id));
                Ok(id)
            }
            Err(e) => {
                if !matches!(e, StoreError::CommitOutcomeUnknown { .. }) {
                    tracker.set(CommitPhase::NotIssued);
                }
                Err(e)
            }
        }
    }

    async fn step<T>(
        &self,
        operation: Operation,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .unwrap_or_else(|_| {
                Err(StoreError::Timeout {
                    operation,
                    after: self.operation_timeout,
                })
            })
    }
}
