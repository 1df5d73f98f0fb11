// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider identifiers and their connection factories.
//!
//! A provider is resolved once, at construction, into an explicit
//! [`ConnectionFactory`] that the executor owns.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use strum::{Display, EnumString};

use orderly_core::OrderError;

use crate::connection::ConnectionFactory;
use crate::error::StoreError;
use crate::sqlite::{DataSource, SqliteConnectionFactory};

/// Supported storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Provider {
    #[strum(to_string = "sqlite", serialize = "microsoft.data.sqlite")]
    Sqlite,
}

impl Provider {
    /// Parses a configured provider identifier.
    pub fn parse(id: &str) -> Result<Self, OrderError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(OrderError::Configuration(
                "storage provider is not set".to_string(),
            ));
        }
        Provider::from_str(id).map_err(|_| {
            OrderError::Configuration(format!("unsupported storage provider `{id}`"))
        })
    }

    /// Builds the connection factory for this provider.
    pub fn connection_factory(
        self,
        connection_string: &str,
        busy_timeout: Duration,
    ) -> Result<Arc<dyn ConnectionFactory>, OrderError> {
        match self {
            Provider::Sqlite => {
                let source = DataSource::parse(connection_string).map_err(configuration)?;
                Ok(Arc::new(SqliteConnectionFactory::new(source, busy_timeout)))
            }
        }
    }
}

/// Lifts a storage configuration error into the caller-facing taxonomy.
pub(crate) fn configuration(err: StoreError) -> OrderError {
    match err {
        StoreError::Configuration(message) => OrderError::Configuration(message),
        other => OrderError::Configuration(other.to_string()),
    }
}
