// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-row note persistence.
//!
//! The store holds at most one note. `load` returns [`Note::EMPTY`] when no
//! row exists; `save` inserts on first write and updates in place after
//! that, keyed by the row id carried in the previous snapshot.

use std::path::Path;

use notelock_core::{Note, NotelockError};
use notelock_secret::Passphrase;
use tracing::debug;

use crate::database::{Database, map_tr_err};

/// Async repository over the keyed note database.
pub struct NoteRepository {
    db: Database,
}

impl NoteRepository {
    /// Open the note store at `path`, keyed by `passphrase`.
    pub async fn open(path: &Path, passphrase: Passphrase) -> Result<Self, NotelockError> {
        let db = Database::open(path, passphrase).await?;
        Ok(Self { db })
    }

    /// Load the current note, or [`Note::EMPTY`] when none has been saved.
    pub async fn load(&self) -> Result<Note, NotelockError> {
        self.db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT _id, content FROM note LIMIT 1")?;
                let mut rows = stmt.query([])?;
                match rows.next()? {
                    Some(row) => Ok(Note::persisted(row.get(0)?, row.get(1)?)),
                    None => Ok(Note::EMPTY),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    /// Persist `content`, returning the stored note.
    ///
    /// `previous` decides the write path: an unpersisted snapshot inserts a
    /// fresh row, a persisted one updates that row in place.
    pub async fn save(&self, previous: &Note, content: String) -> Result<Note, NotelockError> {
        if previous.is_persisted() {
            let id = previous.id();
            let stored = content.clone();
            self.db
                .connection()
                .call(move |conn| {
                    conn.execute(
                        "UPDATE note SET content = ?1 WHERE _id = ?2",
                        rusqlite::params![content, id],
                    )?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!(id, "note updated");
            Ok(Note::persisted(id, Some(stored)))
        } else {
            let stored = content.clone();
            let id = self
                .db
                .connection()
                .call(move |conn| {
                    conn.execute(
                        "INSERT INTO note (content) VALUES (?1)",
                        rusqlite::params![content],
                    )?;
                    Ok(conn.last_insert_rowid())
                })
                .await
                .map_err(map_tr_err)?;
            debug!(id, "note inserted");
            Ok(Note::persisted(id, Some(stored)))
        }
    }
}
