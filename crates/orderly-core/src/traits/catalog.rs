// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product catalog contract.

use async_trait::async_trait;

use crate::error::OrderError;

/// Lookup of sellable products and their unit prices.
#[async_trait]
pub trait ProductCatalog: Send + Sync + 'static {
    /// Returns `true` if `name` is a known product.
    fn product_exists(&self, name: &str) -> bool;

    /// Returns the unit price of `name`, or [`OrderError::ProductNotFound`].
    async fn price_of(&self, name: &str) -> Result<f64, OrderError>;
}
