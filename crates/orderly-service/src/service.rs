// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order intake: validate, price, persist.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use orderly_core::{Order, OrderError, OrderId, OrderRepository, ProductCatalog};

/// A saved order and the id the store gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub id: OrderId,
    pub order: Order,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order {}", self.id)?;
        write!(f, "{}", self.order)
    }
}

/// Turns raw customer input into a persisted order.
pub struct OrderService {
    catalog: Arc<dyn ProductCatalog>,
    repository: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(catalog: Arc<dyn ProductCatalog>, repository: Arc<dyn OrderRepository>) -> Self {
        Self {
            catalog,
            repository,
        }
    }

    /// Validates the input, prices the order, and saves it.
    ///
    /// Checks run in order: customer name, product, quantity. The first
    /// failure is returned and nothing reaches the repository.
    pub async fn process_order(
        &self,
        customer_name: &str,
        product_name: &str,
        quantity_input: &str,
    ) -> Result<Receipt, OrderError> {
        let order = self
            .prepare_order(customer_name, product_name, quantity_input)
            .await?;
        self.save_order(order).await
    }

    /// The validation and pricing half of [`process_order`](Self::process_order).
    /// Never touches the repository.
    pub async fn prepare_order(
        &self,
        customer_name: &str,
        product_name: &str,
        quantity_input: &str,
    ) -> Result<Order, OrderError> {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(OrderError::Validation(
                "customer name cannot be empty".to_string(),
            ));
        }

        if !self.catalog.product_exists(product_name) {
            return Err(OrderError::ProductNotFound {
                name: product_name.to_string(),
            });
        }

        let quantity = parse_quantity(quantity_input)?;
        let price = self.catalog.price_of(product_name).await?;
        Ok(Order::new(customer_name, product_name, quantity, price))
    }

    /// Persists an already prepared order.
    pub async fn save_order(&self, order: Order) -> Result<Receipt, OrderError> {
        match self.repository.save(&order).await {
            Ok(id) => {
                info!(order_id = id.0, total = order.total(), "order processed");
                Ok(Receipt { id, order })
            }
            Err(e) => {
                warn!(error = %e, customer = %order.customer_name, "order not saved");
                Err(e)
            }
        }
    }
}

fn parse_quantity(input: &str) -> Result<i64, OrderError> {
    match input.trim().parse::<i32>() {
        Ok(quantity) if quantity > 0 => Ok(i64::from(quantity)),
        _ => Err(OrderError::Validation(
            "quantity must be a positive integer".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use orderly_test_utils::MockOrderRepository;
    use tracing_test::traced_test;

    fn service() -> (OrderService, Arc<MockOrderRepository>) {
        let repository = Arc::new(MockOrderRepository::new());
        let service = OrderService::new(Arc::new(InMemoryCatalog::default()), repository.clone());
        (service, repository)
    }

    #[traced_test]
    #[tokio::test]
    async fn valid_input_saves_priced_order() {
        let (service, repository) = service();

        let receipt = service.process_order("Alice", "Widget", "3").await.unwrap();

        assert_eq!(receipt.id, OrderId(1));
        assert_eq!(receipt.order, Order::new("Alice", "Widget", 3, 12.99));
        assert_eq!(repository.saved().await, vec![receipt.order.clone()]);
        assert!(logs_contain("order processed"));
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_ignored() {
        let (service, _) = service();
        let receipt = service.process_order("  Bob ", "Gadget", " 2 ").await.unwrap();
        assert_eq!(receipt.order.customer_name, "Bob");
        assert_eq!(receipt.order.quantity, 2);
    }

    #[tokio::test]
    async fn empty_customer_is_rejected_first() {
        let (service, repository) = service();
        let err = service.process_order("   ", "Ghost", "x").await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(msg) if msg == "customer name cannot be empty"));
        assert!(repository.saved().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_rejected_before_quantity() {
        let (service, _) = service();
        let err = service.process_order("Bob", "GhostProduct", "abc").await.unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound { name } if name == "GhostProduct"));
    }

    #[tokio::test]
    async fn non_positive_or_malformed_quantity_is_rejected() {
        let (service, repository) = service();
        for input in ["abc", "0", "-2", "1.5", "", "99999999999"] {
            let err = service.process_order("Bob", "Widget", input).await.unwrap_err();
            assert!(
                matches!(&err, OrderError::Validation(msg) if msg == "quantity must be a positive integer"),
                "`{input}` gave {err:?}"
            );
        }
        assert!(repository.saved().await.is_empty());
    }

    #[tokio::test]
    async fn prepare_order_prices_without_saving() {
        let (service, repository) = service();

        let order = service.prepare_order(" Carol ", "Gadget", "2").await.unwrap();
        assert_eq!(order, Order::new("Carol", "Gadget", 2, 15.49));
        assert!(repository.saved().await.is_empty());

        let receipt = service.save_order(order.clone()).await.unwrap();
        assert_eq!(receipt.order, order);
        assert_eq!(repository.saved().await, vec![order]);
    }

    #[tokio::test]
    async fn repository_errors_propagate() {
        let (service, repository) = service();
        repository.fail_next(OrderError::Cancelled).await;
        let err = service.process_order("Alice", "Widget", "1").await.unwrap_err();
        assert!(matches!(err, OrderError::Cancelled));
    }

    #[test]
    fn receipt_display_includes_id_and_total() {
        let receipt = Receipt {
            id: OrderId(42),
            order: Order::new("Alice", "Widget", 3, 12.99),
        };
        assert_eq!(
            receipt.to_string(),
            "Order #42\nCustomer: Alice\nProduct: Widget\nQuantity: 3\nTotal: $38.97"
        );
    }
}
