// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Orderly configuration system.

use std::io::Write;

use orderly_config::diagnostic::ConfigError;
use orderly_config::model::OrderlyConfig;
use orderly_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use serial_test::serial;

#[test]
fn valid_toml_deserializes_into_orderly_config() {
    let toml = r#"
[storage]
connection_string = "Data Source=/var/lib/orderly/orders.db"
provider = "Microsoft.Data.Sqlite"
busy_timeout_ms = 250
operation_timeout_ms = 2000

[retry]
max_retries = 5
base_delay_ms = 100

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(
        config.storage.connection_string,
        "Data Source=/var/lib/orderly/orders.db"
    );
    assert_eq!(config.storage.provider, "Microsoft.Data.Sqlite");
    assert_eq!(config.storage.busy_timeout_ms, 250);
    assert_eq!(config.storage.operation_timeout_ms, 2000);
    assert_eq!(config.retry.max_retries, 5);
    assert_eq!(config.retry.base_delay_ms, 100);
    assert_eq!(config.log.level, "debug");
}

#[test]
fn defaults_are_sensible() {
    let config = OrderlyConfig::default();
    assert_eq!(config.storage.connection_string, "Data Source=orders.db");
    assert_eq!(config.storage.provider, "sqlite");
    assert_eq!(config.storage.busy_timeout_ms, 5_000);
    assert_eq!(config.storage.operation_timeout_ms, 30_000);
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.base_delay_ms, 1_000);
    assert_eq!(config.log.level, "info");
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("[retry]\nmax_retries = 1\n").unwrap();
    assert_eq!(config.retry.max_retries, 1);
    assert_eq!(config.retry.base_delay_ms, 1_000);
    assert_eq!(config.storage, OrderlyConfig::default().storage);
}

#[test]
fn unknown_key_is_rejected_with_suggestion() {
    let errors = load_and_validate_str("[storage]\nprovder = \"sqlite\"\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(key, "provder");
            assert_eq!(suggestion.as_deref(), Some("provider"));
            assert!(valid_keys.contains("connection_string"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let errors = load_and_validate_str("[retries]\nmax_retries = 1\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "retries"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[retry]\nmax_retries = \"three\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "retry.max_retries"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn validation_errors_surface_from_load() {
    let errors = load_and_validate_str(
        "[storage]\nconnection_string = \"\"\n[retry]\nmax_retries = 50\n",
    )
    .unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let errors = load_and_validate_str("[log]\nlevle = \"info\"\n").unwrap_err();
    let diagnostic: &dyn Diagnostic = &errors[0];
    assert_eq!(
        diagnostic.code().map(|c| c.to_string()).as_deref(),
        Some("orderly::config::unknown_key")
    );

    let mut out = String::new();
    GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, diagnostic)
        .unwrap();
    assert!(out.contains("did you mean `level`?"), "{out}");
}

#[test]
#[serial]
fn explicit_path_loads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[storage]\nconnection_string = \"Data Source=custom.db\"").unwrap();

    let config = load_and_validate_path(file.path()).unwrap();
    assert_eq!(config.storage.connection_string, "Data Source=custom.db");
    assert_eq!(config.storage.provider, "sqlite");
}

#[test]
#[serial]
fn env_overrides_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[retry]\nmax_retries = 2\nbase_delay_ms = 10").unwrap();

    // SAFETY: env mutation is confined to #[serial] tests.
    unsafe { std::env::set_var("ORDERLY_RETRY_MAX_RETRIES", "7") };
    unsafe { std::env::set_var("ORDERLY_STORAGE_BUSY_TIMEOUT_MS", "42") };
    let result = load_and_validate_path(file.path());
    unsafe { std::env::remove_var("ORDERLY_RETRY_MAX_RETRIES") };
    unsafe { std::env::remove_var("ORDERLY_STORAGE_BUSY_TIMEOUT_MS") };

    let config = result.unwrap();
    assert_eq!(config.retry.max_retries, 7);
    assert_eq!(config.retry.base_delay_ms, 10);
    assert_eq!(config.storage.busy_timeout_ms, 42);
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let errors = load_and_validate_path(&dir.path().join("absent.toml")).unwrap_err();
    assert!(errors[0].to_string().contains("does not exist"));
}
