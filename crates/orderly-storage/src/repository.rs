// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrying order repository over the transactional executor.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use orderly_config::{RetryConfig, StorageConfig};
use orderly_core::{Order, OrderError, OrderId, OrderRepository};
use orderly_resilience::{RetryError, RetryObserver, RetryPolicy};

use crate::connection::ConnectionFactory;
use crate::error::{Operation, StoreError};
use crate::executor::{CommitPhase, CommitTracker, TransactionalSaveExecutor};
use crate::provider::Provider;

/// Persists orders with bounded retry over transient storage failures.
pub struct SqliteOrderRepository {
    executor: TransactionalSaveExecutor,
    retry: RetryPolicy<StoreError>,
}

impl SqliteOrderRepository {
    pub fn new(executor: TransactionalSaveExecutor, retry: RetryPolicy<StoreError>) -> Self {
        Self { executor, retry }
    }

    /// Resolves the provider and connection string once, up front.
    ///
    /// A missing connection string or an unknown provider is an
    /// [`OrderError::Configuration`] here, before any save is attempted.
    pub fn from_config(storage: &StorageConfig, retry: &RetryConfig) -> Result<Self, OrderError> {
        if storage.connection_string.trim().is_empty() {
            return Err(OrderError::Configuration(
                "storage connection string is not set".to_string(),
            ));
        }
        let provider = Provider::parse(&storage.provider)?;
        let factory = provider.connection_factory(&storage.connection_string, storage.busy_timeout())?;
        debug!(%provider, "order repository configured");
        Ok(Self::with_factory(factory, storage, retry))
    }

    /// Builds a repository around an explicit connection factory.
    pub fn with_factory(
        factory: Arc<dyn ConnectionFactory>,
        storage: &StorageConfig,
        retry: &RetryConfig,
    ) -> Self {
        Self::new(
            TransactionalSaveExecutor::new(factory, storage.operation_timeout()),
            RetryPolicy::new(retry.max_retries, retry.base_delay()),
        )
    }

    /// Replaces the retry observer.
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver<StoreError>>) -> Self {
        self.retry = self.retry.with_observer(observer);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy<StoreError> {
        &self.retry
    }

    /// Saves `order`, giving up with [`OrderError::Cancelled`] as soon as
    /// `token` fires.
    ///
    /// Cancellation before the commit is issued drops the in-flight attempt,
    /// which releases its connection and discards the uncommitted
    /// transaction. Once `COMMIT` has reached the driver the call no longer
    /// reports `Cancelled`: an unacknowledged commit is
    /// [`OrderError::FatalStorage`] with an unknown outcome, and an
    /// acknowledged one returns its id.
    pub async fn save_with_cancel(
        &self,
        order: &Order,
        token: &CancellationToken,
    ) -> Result<OrderId, OrderError> {
        let tracker = CommitTracker::default();
        tokio::select! {
            biased;
            _ = token.cancelled() => match tracker.phase() {
                CommitPhase::NotIssued => {
                    debug!(customer = %order.customer_name, "save cancelled");
                    Err(OrderError::Cancelled)
                }
                CommitPhase::InFlight => {
                    warn!(customer = %order.customer_name, "save cancelled after commit was issued");
                    Err(into_order_error(RetryError::Fatal(StoreError::CommitOutcomeUnknown {
                        source: Box::new(StoreError::Interrupted {
                            operation: Operation::Commit,
                        }),
                    })))
                }
                CommitPhase::Committed(id) => {
                    debug!(order_id = id.0, "save cancelled after commit, keeping result");
                    Ok(id)
                }
            },
            result = self.save_order(order, &tracker) => result,
        }
    }

    async fn save_order(
        &self,
        order: &Order,
        tracker: &CommitTracker,
    ) -> Result<OrderId, OrderError> {
        self.retry
            .execute(move || self.executor.run_tracked(order, tracker))
            .await
            .map_err(into_order_error)
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn save(&self, order: &Order) -> Result<OrderId, OrderError> {
        self.save_order(order, &CommitTracker::default()).await
    }
}

fn into_order_error(err: RetryError<StoreError>) -> OrderError {
    match err {
        RetryError::Fatal(StoreError::Configuration(message)) => {
            error!(%message, "order store misconfigured");
            OrderError::Configuration(message)
        }
        RetryError::Fatal(source) => {
            error!(error = %source, "order store rejected save");
            OrderError::FatalStorage {
                source: Box::new(source),
            }
        }
        RetryError::Exhausted { attempts, last } => {
            error!(attempts, error = %last, "order save retries exhausted");
            OrderError::RetryExhausted {
                attempts,
                source: Box::new(last),
            }
        }
    }
}
