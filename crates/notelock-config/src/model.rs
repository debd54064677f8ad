// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for notelock.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level notelock configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotelockConfig {
    /// Device key store settings.
    #[serde(default)]
    pub keystore: KeystoreConfig,

    /// Passphrase container settings.
    #[serde(default)]
    pub secret: SecretConfig,

    /// Note database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Device key store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeystoreConfig {
    /// Directory holding device key files.
    #[serde(default = "default_keystore_dir")]
    pub dir: PathBuf,

    /// Name of the key protecting the passphrase container.
    #[serde(default = "default_key_name")]
    pub key_name: String,

    /// Seconds a user authentication stays valid for key use.
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            dir: default_keystore_dir(),
            key_name: default_key_name(),
            auth_timeout_secs: default_auth_timeout_secs(),
        }
    }
}

fn default_keystore_dir() -> PathBuf {
    data_dir().join("keys")
}

fn default_key_name() -> String {
    "notelock-passphrase".to_string()
}

fn default_auth_timeout_secs() -> u64 {
    60
}

/// Passphrase container configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecretConfig {
    /// Path of the encrypted passphrase container file.
    #[serde(default = "default_container_path")]
    pub container_path: PathBuf,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            container_path: default_container_path(),
        }
    }
}

fn default_container_path() -> PathBuf {
    data_dir().join("passphrase.bin")
}

/// Note database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path of the encrypted note database.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    data_dir().join("note.db")
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Base data directory: `~/.local/share/notelock` on XDG platforms, with a
/// relative fallback when no home directory can be resolved.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("notelock"))
        .unwrap_or_else(|| PathBuf::from(".notelock"))
}
