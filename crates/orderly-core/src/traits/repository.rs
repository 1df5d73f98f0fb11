// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order persistence contract.

use async_trait::async_trait;

use crate::error::OrderError;
use crate::types::{Order, OrderId};

/// Durable sink for orders.
///
/// Implementations own transaction boundaries and retry. A successful call
/// means exactly one row for `order` is committed. A failed call means none
/// is, except for an [`OrderError::FatalStorage`] whose commit was sent but
/// never acknowledged: that row may exist and the save must not be repeated
/// blindly.
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Persists `order` and returns the id the store assigned to it.
    ///
    /// Errors are [`OrderError::Configuration`], [`OrderError::RetryExhausted`],
    /// [`OrderError::FatalStorage`], or [`OrderError::Cancelled`].
    async fn save(&self, order: &Order) -> Result<OrderId, OrderError>;
}
