// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal session driving the controller: the UI stand-in.
//!
//! The session wires keystore, secret store, and controller together and
//! answers `auth_required` events by prompting the operator on stdin. A
//! real device would show a credential prompt here; the terminal asks for
//! an explicit yes.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use notelock_config::NotelockConfig;
use notelock_controller::{NoteController, NoteEvents};
use notelock_core::{DeviceKeyStore, Note, NotelockError, OperationKind};
use notelock_keystore::SoftwareKeyStore;
use notelock_secret::SecretStore;
use tracing::debug;

pub struct Session {
    keystore: Arc<SoftwareKeyStore>,
    controller: NoteController,
    events: NoteEvents,
}

impl Session {
    /// Compose keystore, secret store, and controller from configuration.
    pub fn open(config: &NotelockConfig) -> Result<Self, NotelockError> {
        let keystore = Arc::new(SoftwareKeyStore::open(&config.keystore.dir)?);
        let secrets = SecretStore::new(
            Arc::clone(&keystore) as Arc<dyn DeviceKeyStore>,
            config.secret.container_path.clone(),
            config.keystore.key_name.clone(),
            Duration::from_secs(config.keystore.auth_timeout_secs),
        );
        let (controller, events) =
            NoteController::spawn(secrets, config.storage.database_path.clone());

        Ok(Self {
            keystore,
            controller,
            events,
        })
    }

    /// Load the current note, re-authenticating on demand.
    pub async fn load(&mut self) -> Result<Note, NotelockError> {
        self.controller.load().await?;
        loop {
            tokio::select! {
                changed = self.events.note.changed() => {
                    changed.map_err(|_| worker_gone())?;
                    return Ok(self.events.note.borrow_and_update().clone());
                }
                kind = self.events.auth_required.recv() => {
                    self.reauthenticate(kind.ok_or_else(worker_gone)?).await?;
                }
                problem = self.events.problems.recv() => {
                    return Err(problem.ok_or_else(worker_gone)?);
                }
            }
        }
    }

    /// Save `content`, re-authenticating on demand, and return the note as
    /// persisted.
    pub async fn save(&mut self, content: String) -> Result<Note, NotelockError> {
        self.controller.save(content).await?;
        loop {
            tokio::select! {
                saved = self.events.saved.recv() => {
                    return saved.ok_or_else(worker_gone);
                }
                kind = self.events.auth_required.recv() => {
                    self.reauthenticate(kind.ok_or_else(worker_gone)?).await?;
                }
                problem = self.events.problems.recv() => {
                    return Err(problem.ok_or_else(worker_gone)?);
                }
            }
        }
    }

    pub async fn shutdown(self) -> Result<(), NotelockError> {
        self.controller.shutdown().await
    }

    /// Prompt the operator and either resume or abandon the parked
    /// operation of `kind`.
    async fn reauthenticate(&mut self, kind: OperationKind) -> Result<(), NotelockError> {
        debug!(%kind, "re-authentication requested");

        let confirmed = tokio::task::spawn_blocking(move || prompt_confirm(kind))
            .await
            .map_err(|err| NotelockError::Internal(format!("prompt task failed: {err}")))??;

        if confirmed {
            self.keystore.record_authentication();
            self.controller.auth_confirmed(kind).await
        } else {
            self.controller.auth_declined(kind).await?;
            Err(NotelockError::AuthenticationRequired)
        }
    }
}

fn prompt_confirm(kind: OperationKind) -> Result<bool, NotelockError> {
    let mut stderr = std::io::stderr();
    write!(
        stderr,
        "authentication required to {kind} the note; authenticate now? [y/N] "
    )?;
    stderr.flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn worker_gone() -> NotelockError {
    NotelockError::Internal("controller worker is not running".to_string())
}
