// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: SQLCipher keying, wrong-key detection,
//! and migrations.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread; the [`Database`] struct IS the single writer. Do NOT create
//! additional Connection instances against the same file.

use std::path::Path;

use notelock_core::NotelockError;
use notelock_secret::Passphrase;
use tracing::debug;

use crate::migrations;

/// Errors raised inside the open closure, before they are mapped onto the
/// notelock taxonomy.
#[derive(Debug, thiserror::Error)]
enum OpenError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Migration(#[from] refinery::Error),
}

/// A keyed SQLCipher database handle.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the note database, keyed by the passphrase.
    ///
    /// Ownership of the passphrase transfers in; it is wiped when keying is
    /// done. The passphrase is applied via `PRAGMA key` before any other
    /// statement, and a probe statement follows immediately: SQLCipher
    /// reports a wrong key as "file is not a database" on the first real
    /// statement, which surfaces here as
    /// [`NotelockError::MalformedSecret`].
    pub async fn open(path: &Path, passphrase: Passphrase) -> Result<Self, NotelockError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(NotelockError::storage)?;

        conn.call(move |conn| -> Result<(), OpenError> {
            conn.pragma_update(None, "key", passphrase.expose_secret())?;
            drop(passphrase);
            conn.execute_batch("SELECT count(*) FROM sqlite_master;")?;
            migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(map_open_err)?;

        debug!(path = %path.display(), "note database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection for query modules.
    pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

/// Convert open-path failures to NotelockError, distinguishing the
/// wrong-passphrase signature from other failures.
fn map_open_err(e: tokio_rusqlite::Error<OpenError>) -> NotelockError {
    if let tokio_rusqlite::Error::Error(OpenError::Sqlite(rusqlite::Error::SqliteFailure(
        code,
        _,
    ))) = &e
        && code.code == rusqlite::ErrorCode::NotADatabase
    {
        return NotelockError::MalformedSecret(
            "passphrase failed to unlock the note store".to_string(),
        );
    }
    NotelockError::storage(e)
}

/// Convert tokio-rusqlite errors from query paths to NotelockError.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> NotelockError {
    NotelockError::storage(e)
}
