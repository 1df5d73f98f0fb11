// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::OrderlyConfig;

/// Retry counts above this are almost certainly a unit mistake.
pub const MAX_RETRIES_LIMIT: u32 = 10;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &OrderlyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.connection_string.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.connection_string must not be empty".to_string(),
        });
    }

    if config.storage.provider.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.provider must not be empty".to_string(),
        });
    }

    if config.storage.busy_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.busy_timeout_ms must be greater than zero".to_string(),
        });
    }

    if config.storage.operation_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.operation_timeout_ms must be greater than zero".to_string(),
        });
    }

    if config.retry.max_retries > MAX_RETRIES_LIMIT {
        errors.push(ConfigError::Validation {
            message: format!(
                "retry.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                config.retry.max_retries
            ),
        });
    }

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
