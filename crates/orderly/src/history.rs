// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `orderly history` and `orderly products`.

use colored::Colorize;

use orderly_config::OrderlyConfig;
use orderly_core::OrderError;
use orderly_service::InMemoryCatalog;
use orderly_storage::prepare_store;
use orderly_storage::queries::orders::{StoredOrder, list_orders};

/// Runs the `orderly history` command.
pub async fn run_history(config: &OrderlyConfig, limit: Option<u32>) -> Result<(), OrderError> {
    let source = prepare_store(&config.storage).await?;
    let orders = list_orders(&source, limit)
        .await
        .map_err(|e| OrderError::FatalStorage {
            source: Box::new(e),
        })?;

    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:>6}  {:<20} {:<12} {:>5} {:>10}",
            "ID", "CUSTOMER", "PRODUCT", "QTY", "TOTAL"
        )
        .bold()
    );
    for stored in &orders {
        println!("{}", history_row(stored));
    }
    Ok(())
}

fn history_row(stored: &StoredOrder) -> String {
    let order = &stored.order;
    format!(
        "{:>6}  {:<20} {:<12} {:>5} {:>10}",
        stored.id.to_string(),
        order.customer_name,
        order.product_name,
        order.quantity,
        format!("${:.2}", order.total())
    )
}

/// Runs the `orderly products` command.
pub fn print_products() {
    let catalog = InMemoryCatalog::default();
    for (name, price) in catalog.products() {
        println!("{:<12} {}", name.cyan(), format!("${price:.2}"));
    }
}
