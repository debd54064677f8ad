// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The serial worker behind [`NoteController`](crate::NoteController).
//!
//! One task consumes commands in order, so at most one operation is in
//! flight and a save issued during another save simply queues behind it.
//! Every operation re-acquires the passphrase through the auth-gated
//! secret store, which is what makes a lapsed authentication window
//! surface on load and save and not just on first open.

use std::path::PathBuf;
use std::sync::Arc;

use notelock_core::{Note, NotelockError, OperationKind};
use notelock_secret::SecretStore;
use notelock_storage::NoteRepository;
use tokio::sync::{OnceCell, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Command;
use crate::events::EventSinks;

pub(crate) struct Worker {
    secrets: Arc<SecretStore>,
    db_path: PathBuf,
    repo: OnceCell<NoteRepository>,
    events: EventSinks,
    /// Last successfully loaded or saved note; the implicit `previous`
    /// for saves.
    current: Note,
    /// Parked operations awaiting a fresh authentication, per kind. A new
    /// save attempt replaces a parked one.
    pending_load: bool,
    pending_save: Option<String>,
}

impl Worker {
    pub(crate) fn new(secrets: SecretStore, db_path: PathBuf, events: EventSinks) -> Self {
        Self {
            secrets: Arc::new(secrets),
            db_path,
            repo: OnceCell::new(),
            events,
            current: Note::EMPTY,
            pending_load: false,
            pending_save: None,
        }
    }

    /// Run until the command channel closes or the token is cancelled.
    /// The command in progress always finishes first.
    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<Command>, cancel: CancellationToken) {
        info!("note controller worker running");

        loop {
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd).await,
                        None => break,
                    }
                }
                _ = cancel.cancelled() => {
                    debug!("shutdown signal received, stopping worker");
                    break;
                }
            }
        }

        info!("note controller worker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Load => self.run_load().await,
            Command::Save(content) => self.run_save(content).await,
            Command::AuthConfirmed(kind) => self.resume(kind).await,
            Command::AuthDeclined(kind) => self.abandon(kind),
        }
    }

    async fn run_load(&mut self) {
        debug!("load requested");
        // A fresh attempt supersedes a parked one of the same kind.
        self.pending_load = false;
        let result = async {
            let repo = self.repository().await?;
            repo.load().await
        }
        .await;

        match result {
            Ok(note) => {
                debug!(id = note.id(), "note loaded");
                self.current = note.clone();
                let _ = self.events.note.send(note);
            }
            Err(err) => self.dispatch_failure(OperationKind::Load, err, None),
        }
    }

    async fn run_save(&mut self, content: String) {
        debug!("save requested");
        self.pending_save = None;
        let previous = self.current.clone();
        let attempt = content.clone();
        let result = async {
            let repo = self.repository().await?;
            repo.save(&previous, attempt).await
        }
        .await;

        match result {
            Ok(note) => {
                debug!(id = note.id(), "note saved");
                self.current = note.clone();
                let _ = self.events.note.send(note.clone());
                let _ = self.events.saved.send(note);
            }
            Err(err) => self.dispatch_failure(OperationKind::Save, err, Some(content)),
        }
    }

    /// Re-run the parked operation of `kind` after the caller reports a
    /// fresh authentication.
    async fn resume(&mut self, kind: OperationKind) {
        match kind {
            OperationKind::Load => {
                if self.pending_load {
                    self.pending_load = false;
                    self.run_load().await;
                } else {
                    warn!(%kind, "authentication confirmed but no operation is parked");
                }
            }
            OperationKind::Save => match self.pending_save.take() {
                Some(content) => self.run_save(content).await,
                None => warn!(%kind, "authentication confirmed but no operation is parked"),
            },
        }
    }

    /// Drop the parked operation of `kind`; the caller declined to
    /// re-authenticate.
    fn abandon(&mut self, kind: OperationKind) {
        let was_parked = match kind {
            OperationKind::Load => std::mem::take(&mut self.pending_load),
            OperationKind::Save => self.pending_save.take().is_some(),
        };
        if was_parked {
            debug!(%kind, "parked operation abandoned");
        }
    }

    /// Classify a failure: `AuthenticationRequired` parks the operation and
    /// asks the UI for a fresh authentication; everything else is terminal.
    fn dispatch_failure(&mut self, kind: OperationKind, err: NotelockError, payload: Option<String>) {
        if err.is_authentication_required() {
            info!(%kind, "operation parked pending re-authentication");
            match kind {
                OperationKind::Load => self.pending_load = true,
                OperationKind::Save => self.pending_save = payload,
            }
            let _ = self.events.auth_required.send(kind);
        } else {
            warn!(%kind, error = %err, "operation failed");
            let _ = self.events.problems.send(err);
        }
    }

    /// The passphrase is re-acquired through the auth-gated secret store on
    /// EVERY operation; the repository itself is opened at most once per
    /// process and the later passphrase copies are dropped unused.
    async fn repository(&self) -> Result<&NoteRepository, NotelockError> {
        let secrets = Arc::clone(&self.secrets);
        let passphrase = tokio::task::spawn_blocking(move || secrets.load_or_create())
            .await
            .map_err(|err| NotelockError::Internal(format!("secret store task failed: {err}")))??;

        self.repo
            .get_or_try_init(|| NoteRepository::open(&self.db_path, passphrase))
            .await
    }
}
