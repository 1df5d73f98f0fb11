// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Lookup order: `./orderly.toml` > `~/.config/orderly/orderly.toml` >
//! `/etc/orderly/orderly.toml`, with `ORDERLY_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OrderlyConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/orderly/orderly.toml";
pub(crate) const LOCAL_CONFIG: &str = "orderly.toml";

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/orderly/orderly.toml`
/// 3. `~/.config/orderly/orderly.toml`
/// 4. `./orderly.toml`
/// 5. `ORDERLY_*` environment variables
pub fn load_config() -> Result<OrderlyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<OrderlyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OrderlyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OrderlyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OrderlyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OrderlyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("orderly/orderly.toml"))
}

/// Maps `ORDERLY_<SECTION>_<KEY>` onto `section.key`.
///
/// Only the section prefix is rewritten, so `ORDERLY_STORAGE_BUSY_TIMEOUT_MS`
/// becomes `storage.busy_timeout_ms` and not `storage.busy.timeout.ms`.
fn env_provider() -> Env {
    Env::prefixed("ORDERLY_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("storage_", "storage.", 1)
            .replacen("retry_", "retry.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
