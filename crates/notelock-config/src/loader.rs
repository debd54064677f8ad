// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./notelock.toml` > `~/.config/notelock/notelock.toml`
//! > `/etc/notelock/notelock.toml` with environment variable overrides via the
//! `NOTELOCK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::NotelockConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/notelock/notelock.toml` (system-wide)
/// 3. `~/.config/notelock/notelock.toml` (user XDG config)
/// 4. `./notelock.toml` (local directory)
/// 5. `NOTELOCK_*` environment variables
pub fn load_config() -> Result<NotelockConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NotelockConfig::default()))
        .merge(Toml::file("/etc/notelock/notelock.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("notelock/notelock.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("notelock.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<NotelockConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NotelockConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NotelockConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NotelockConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `NOTELOCK_KEYSTORE_AUTH_TIMEOUT_SECS`
/// must map to `keystore.auth_timeout_secs`, not `keystore.auth.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("NOTELOCK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let mapped = key
            .as_str()
            .replacen("keystore_", "keystore.", 1)
            .replacen("secret_", "secret.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [keystore]
            auth_timeout_secs = 5

            [log]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.keystore.auth_timeout_secs, 5);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.keystore.key_name, "notelock-passphrase");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = load_config_from_str("[keystore]\nauth_timeout = 5\n").unwrap_err();
        assert!(err.to_string().contains("auth_timeout"));
    }
}
