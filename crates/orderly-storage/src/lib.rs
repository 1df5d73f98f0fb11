// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite order persistence for Orderly.
//!
//! A save runs as one transaction on a connection that lives for a single
//! attempt: [`TransactionalSaveExecutor`] opens it, inserts with named
//! parameters, commits or rolls back, and releases it on every exit path.
//! [`SqliteOrderRepository`] wraps the executor in a
//! [`RetryPolicy`](orderly_resilience::RetryPolicy) and maps the outcome onto
//! [`OrderError`](orderly_core::OrderError).

pub mod connection;
pub mod error;
pub mod executor;
pub mod provider;
pub mod queries;
pub mod repository;
pub mod schema;
pub mod sqlite;

pub use connection::{ConnectionFactory, StoreConnection};
pub use error::{Operation, StoreError};
pub use executor::TransactionalSaveExecutor;
pub use provider::Provider;
pub use repository::SqliteOrderRepository;
pub use schema::{ensure_schema, prepare_store};
pub use sqlite::{DataSource, SqliteConnection, SqliteConnectionFactory};
