// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for notelock.
//!
//! The taxonomy separates one recoverable failure from everything else:
//! [`NotelockError::AuthenticationRequired`] means the device key's
//! recent-authentication window has lapsed and the exact same operation can
//! be retried after the user re-authenticates. Every other variant is
//! terminal and is surfaced to the caller unmodified.

use thiserror::Error;

/// The primary error type used across all notelock crates.
#[derive(Debug, Error)]
pub enum NotelockError {
    /// The device-bound key's authentication window has lapsed.
    ///
    /// Recoverable: re-authenticate and retry the same operation. No layer
    /// may catch this and generalize it into another variant.
    #[error("user authentication required")]
    AuthenticationRequired,

    /// Key store malfunction: key missing, key file corrupt, or a
    /// cryptographic operation failed for a reason other than the
    /// authentication window. Not retryable.
    #[error("device key unavailable: {0}")]
    KeyUnavailable(String),

    /// Storage backend errors (database open, query failure, constraint
    /// violation, container I/O). Not retryable.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The decrypted secret failed to decode or to unlock the note store.
    /// Treated as corruption, not as an authentication lapse.
    #[error("malformed secret: {0}")]
    MalformedSecret(String),

    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors outside the storage backend.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NotelockError {
    /// True only for the recoverable authentication-window failure.
    ///
    /// The orchestrator uses this to decide between emitting a retry signal
    /// and emitting a terminal problem.
    pub fn is_authentication_required(&self) -> bool {
        matches!(self, NotelockError::AuthenticationRequired)
    }

    /// Wrap an arbitrary storage-layer error.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        NotelockError::Storage {
            source: Box::new(source),
        }
    }
}
