// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory product catalog.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{debug, warn};

use orderly_core::{OrderError, ProductCatalog};

/// Product name to unit price, matched case-sensitively.
#[derive(Debug)]
pub struct InMemoryCatalog {
    prices: RwLock<BTreeMap<String, f64>>,
}

impl InMemoryCatalog {
    /// A catalog with no products.
    pub fn empty() -> Self {
        Self {
            prices: RwLock::new(BTreeMap::new()),
        }
    }

    /// Adds a product or changes its price.
    pub fn upsert(&self, name: impl Into<String>, price: f64) -> Result<(), OrderError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OrderError::Validation(
                "product name cannot be empty".to_string(),
            ));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(OrderError::Validation(format!(
                "price for '{name}' must be a non-negative number"
            )));
        }
        debug!(product = %name, price, "catalog upsert");
        self.write().insert(name, price);
        Ok(())
    }

    /// Removes a product. Returns `false` if it was not listed.
    pub fn remove(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// All products, sorted by name.
    pub fn products(&self) -> Vec<(String, f64)> {
        self.read()
            .iter()
            .map(|(name, price)| (name.clone(), *price))
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, f64>> {
        self.prices.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, f64>> {
        self.prices.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryCatalog {
    /// The stock catalog: Widget, Gadget, Doohickey.
    fn default() -> Self {
        let prices = [("Widget", 12.99), ("Gadget", 15.49), ("Doohickey", 8.75)]
            .into_iter()
            .map(|(name, price)| (name.to_string(), price))
            .collect();
        Self {
            prices: RwLock::new(prices),
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    fn product_exists(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    async fn price_of(&self, name: &str) -> Result<f64, OrderError> {
        let price = self.read().get(name).copied();
        price.ok_or_else(|| {
            warn!(product = %name, "product not found");
            OrderError::ProductNotFound {
                name: name.to_string(),
            }
        })
    }
}
