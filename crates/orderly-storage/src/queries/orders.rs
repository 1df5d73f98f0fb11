// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order lookups.

use rusqlite::params;

use orderly_core::{Order, OrderId};

use crate::error::{Operation, StoreError};
use crate::queries::connect;
use crate::sqlite::DataSource;

/// An order as persisted, with its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
    pub id: OrderId,
    pub order: Order,
}

/// Number of rows in `Orders`.
pub async fn count_orders(source: &DataSource) -> Result<i64, StoreError> {
    let conn = connect(source).await?;
    conn.call(|conn| -> rusqlite::Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM Orders", [], |row| row.get(0))
    })
    .await
    .map_err(|e| StoreError::from_driver(Operation::Query, e))
}

/// Most recent orders first. `None` returns every row.
pub async fn list_orders(
    source: &DataSource,
    limit: Option<u32>,
) -> Result<Vec<StoredOrder>, StoreError> {
    let limit = limit.map(i64::from).unwrap_or(-1);
    let conn = connect(source).await?;
    conn.call(move |conn| -> rusqlite::Result<Vec<StoredOrder>> {
        let mut stmt = conn.prepare(
            "SELECT Id, CustomerName, ProductName, Quantity, Price
             FROM Orders
             ORDER BY Id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], row_to_stored_order)?;
        rows.collect()
    })
    .await
    .map_err(|e| StoreError::from_driver(Operation::Query, e))
}

/// Fetches one order by id.
pub async fn find_order(source: &DataSource, id: OrderId) -> Result<Option<StoredOrder>, StoreError> {
    let conn = connect(source).await?;
    conn.call(move |conn| -> rusqlite::Result<Option<StoredOrder>> {
        let result = conn.query_row(
            "SELECT Id, CustomerName, ProductName, Quantity, Price FROM Orders WHERE Id = ?1",
            params![id.0],
            row_to_stored_order,
        );
        match result {
            Ok(stored) => Ok(Some(stored)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
    .map_err(|e| StoreError::from_driver(Operation::Query, e))
}

fn row_to_stored_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredOrder> {
    Ok(StoredOrder {
        id: OrderId(row.get(0)?),
        order: Order {
            customer_name: row.get(1)?,
            product_name: row.get(2)?,
            quantity: row.get(3)?,
            price: row.get(4)?,
        },
    })
}
