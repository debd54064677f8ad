// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and key name charsets.

use crate::diagnostic::ConfigError;
use crate::model::NotelockConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &NotelockConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.keystore.key_name.is_empty() {
        errors.push(ConfigError::Validation {
            message: "keystore.key_name must not be empty".to_string(),
        });
    }

    // The key name doubles as a file name inside keystore.dir; restrict it
    // to a charset that cannot traverse directories.
    if !config
        .keystore
        .key_name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
        || config.keystore.key_name.contains("..")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "keystore.key_name `{}` may only contain ASCII letters, digits, `-`, `_` and `.`",
                config.keystore.key_name
            ),
        });
    }

    if config.keystore.auth_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "keystore.auth_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.keystore.dir.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "keystore.dir must not be empty".to_string(),
        });
    }

    if config.secret.container_path.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "secret.container_path must not be empty".to_string(),
        });
    }

    if config.storage.database_path.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of: {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
