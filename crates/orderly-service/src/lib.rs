// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order intake for Orderly: the product catalog and the service that turns
//! raw console input into a persisted [`Order`](orderly_core::Order).

pub mod catalog;
pub mod service;

pub use catalog::InMemoryCatalog;
pub use service::{OrderService, Receipt};
