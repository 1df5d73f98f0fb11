// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Orderly.
//!
//! Holds the [`Order`] entity, the [`OrderError`] taxonomy shared by every
//! layer, and the capability traits that storage and catalog backends
//! implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::OrderError;
pub use traits::{OrderRepository, ProductCatalog};
pub use types::{Order, OrderId};
