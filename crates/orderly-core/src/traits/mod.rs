// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits consumed by the order service.

pub mod catalog;
pub mod repository;

pub use catalog::ProductCatalog;
pub use repository::OrderRepository;
