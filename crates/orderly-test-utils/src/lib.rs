// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Orderly integration tests.
//!
//! # Components
//!
//! - [`TestStore`] - Temporary SQLite database with the `Orders` schema
//! - [`FaultInjectingFactory`] - Real SQLite connections with scripted failures
//! - [`NullConnectionFactory`] - Factory that never yields a connection
//! - [`RecordingObserver`] - Captures retry notifications
//! - [`MockOrderRepository`] - In-memory repository with queued outcomes

pub mod fault;
pub mod harness;
pub mod mock_repository;
pub mod observer;

pub use fault::{Fault, FaultInjectingFactory, FaultKind, FaultStep, NullConnectionFactory};
pub use harness::TestStore;
pub use mock_repository::MockOrderRepository;
pub use observer::RecordingObserver;
