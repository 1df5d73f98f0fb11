// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order entity and identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Row id assigned by the store to a persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A customer order for a single product line.
///
/// Non-empty names and a positive quantity are enforced by whoever builds the
/// order; storage persists it as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i64,
    /// Unit price.
    pub price: f64,
}

impl Order {
    pub fn new(
        customer_name: impl Into<String>,
        product_name: impl Into<String>,
        quantity: i64,
        price: f64,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            product_name: product_name.into(),
            quantity,
            price,
        }
    }

    /// Quantity times unit price. Derived on demand, never stored.
    pub fn total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Customer: {}", self.customer_name)?;
        writeln!(f, "Product: {}", self.product_name)?;
        writeln!(f, "Quantity: {}", self.quantity)?;
        write!(f, "Total: ${:.2}", self.total())
    }
}
