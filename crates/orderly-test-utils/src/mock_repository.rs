// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory order repository for service-level tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use orderly_core::{Order, OrderError, OrderId, OrderRepository};

/// Records saved orders and assigns sequential ids.
///
/// Queued failures are returned, in order, before any save succeeds.
#[derive(Default)]
pub struct MockOrderRepository {
    saved: Mutex<Vec<Order>>,
    failures: Mutex<VecDeque<OrderError>>,
    next_id: AtomicI64,
}

impl MockOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error for the next `save` call.
    pub async fn fail_next(&self, error: OrderError) {
        self.failures.lock().await.push_back(error);
    }

    /// Orders saved successfully so far.
    pub async fn saved(&self) -> Vec<Order> {
        self.saved.lock().await.clone()
    }
}

#[async_trait]
impl OrderRepository for MockOrderRepository {
    async fn save(&self, order: &Order) -> Result<OrderId, OrderError> {
        if let Some(error) = self.failures.lock().await.pop_front() {
            return Err(error);
        }
        self.saved.lock().await.push(order.clone());
        Ok(OrderId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1))
    }
}
