// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for order processing.

use thiserror::Error;

/// The error type returned by order repositories, catalogs, and the order service.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Caller input was rejected before reaching storage (empty name, bad quantity).
    #[error("invalid order: {0}")]
    Validation(String),

    /// The requested product is not in the catalog.
    #[error("product '{name}' not found")]
    ProductNotFound { name: String },

    /// Storage is misconfigured or the connection factory produced no usable handle.
    ///
    /// Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transient storage failures outlasted the retry budget.
    #[error("order not saved after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The store rejected the order for a reason retrying cannot fix.
    #[error("storage rejected order: {source}")]
    FatalStorage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The save was abandoned before it completed.
    #[error("save cancelled")]
    Cancelled,
}

impl OrderError {
    /// Returns `true` for errors that originate from the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            OrderError::RetryExhausted { .. } | OrderError::FatalStorage { .. }
        )
    }
}
