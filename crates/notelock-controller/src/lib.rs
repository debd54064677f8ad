// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auth-retry orchestration for notelock.
//!
//! The [`NoteController`] is the coordinator between the UI layer, the
//! encrypted secret store, and the note repository. It:
//! - sequences secret retrieval before note access on every operation
//! - parks an operation that failed with `AuthenticationRequired` and asks
//!   the UI for a fresh authentication
//! - resumes the parked operation on confirmation, drops it on decline
//! - passes every other failure through unmodified as a terminal problem
//! - handles graceful shutdown

mod events;
mod worker;

use std::path::PathBuf;

use notelock_core::{NotelockError, OperationKind};
use notelock_secret::SecretStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use events::NoteEvents;

/// Commands accepted by the controller, processed strictly in order.
#[derive(Debug)]
pub enum Command {
    /// Load the current note (creating key, secret, and store on first use).
    Load,
    /// Persist the given content against the last observed note.
    Save(String),
    /// The user re-authenticated; resume the parked operation of this kind.
    AuthConfirmed(OperationKind),
    /// The user declined to re-authenticate; drop the parked operation.
    AuthDeclined(OperationKind),
}

/// Handle to the controller's worker task.
///
/// Dropping the handle closes the command channel and lets the worker wind
/// down on its own; [`shutdown`](NoteController::shutdown) does so
/// deterministically and joins the task.
pub struct NoteController {
    commands: mpsc::Sender<Command>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Capacity of the command queue. Commands beyond it apply backpressure to
/// the caller rather than piling up unboundedly.
const COMMAND_QUEUE_DEPTH: usize = 16;

impl NoteController {
    /// Spawn the worker task and return the controller handle plus the
    /// outcome channels for the UI layer.
    pub fn spawn(secrets: SecretStore, db_path: PathBuf) -> (Self, NoteEvents) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (sinks, events) = events::channel();
        let cancel = CancellationToken::new();

        let worker = worker::Worker::new(secrets, db_path, sinks);
        let handle = tokio::spawn(worker.run(command_rx, cancel.clone()));

        (
            Self {
                commands: command_tx,
                cancel,
                handle,
            },
            events,
        )
    }

    /// Request a load of the current note.
    pub async fn load(&self) -> Result<(), NotelockError> {
        self.send(Command::Load).await
    }

    /// Request a save of `content`.
    pub async fn save(&self, content: String) -> Result<(), NotelockError> {
        self.send(Command::Save(content)).await
    }

    /// Report that the user re-authenticated; the parked operation of
    /// `kind` re-runs.
    pub async fn auth_confirmed(&self, kind: OperationKind) -> Result<(), NotelockError> {
        self.send(Command::AuthConfirmed(kind)).await
    }

    /// Report that the user declined to re-authenticate; the parked
    /// operation of `kind` is abandoned.
    pub async fn auth_declined(&self, kind: OperationKind) -> Result<(), NotelockError> {
        self.send(Command::AuthDeclined(kind)).await
    }

    /// Stop the worker and wait for it to finish. The command in progress
    /// completes before the task exits.
    pub async fn shutdown(self) -> Result<(), NotelockError> {
        self.cancel.cancel();
        self.handle
            .await
            .map_err(|err| NotelockError::Internal(format!("controller worker failed: {err}")))
    }

    async fn send(&self, cmd: Command) -> Result<(), NotelockError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| NotelockError::Internal("controller worker is not running".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use notelock_core::{DeviceKeyStore, Note, NotelockError, OperationKind};
    use notelock_keystore::SoftwareKeyStore;
    use notelock_secret::SecretStore;

    use super::*;

    const AUTH_WINDOW: Duration = Duration::from_secs(60);

    fn controller(
        dir: &std::path::Path,
    ) -> (Arc<SoftwareKeyStore>, NoteController, NoteEvents) {
        let keystore = Arc::new(SoftwareKeyStore::open(dir.join("keys")).unwrap());
        let secrets = SecretStore::new(
            Arc::clone(&keystore) as Arc<dyn DeviceKeyStore>,
            dir.join("passphrase.bin"),
            "note-key",
            AUTH_WINDOW,
        );
        let (controller, events) = NoteController::spawn(secrets, dir.join("note.db"));
        (keystore, controller, events)
    }

    #[tokio::test]
    async fn full_session_with_reauthentication() {
        let dir = tempfile::tempdir().unwrap();
        let (keystore, controller, mut events) = controller(dir.path());
        keystore.record_authentication();

        // First use: no secret file exists yet; load creates key,
        // passphrase, and an empty store.
        controller.load().await.unwrap();
        events.note.changed().await.unwrap();
        assert_eq!(*events.note.borrow_and_update(), Note::EMPTY);

        controller.save("first note".to_string()).await.unwrap();
        let saved = events.saved.recv().await.unwrap();
        assert_eq!(saved.id(), 1);
        assert_eq!(saved.content(), Some("first note"));

        // Authentication window expires; the save parks and asks for a
        // fresh authentication instead of failing terminally.
        keystore.clear_authentication();
        controller.save("edit".to_string()).await.unwrap();
        assert_eq!(
            events.auth_required.recv().await.unwrap(),
            OperationKind::Save
        );

        keystore.record_authentication();
        controller.auth_confirmed(OperationKind::Save).await.unwrap();
        let saved = events.saved.recv().await.unwrap();
        assert_eq!(saved.id(), 1);
        assert_eq!(saved.content(), Some("edit"));

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn load_parks_when_authentication_lapsed() {
        let dir = tempfile::tempdir().unwrap();
        let (keystore, controller, mut events) = controller(dir.path());

        // Never authenticated: the very first load must park, not fail.
        controller.load().await.unwrap();
        assert_eq!(
            events.auth_required.recv().await.unwrap(),
            OperationKind::Load
        );

        keystore.record_authentication();
        controller.auth_confirmed(OperationKind::Load).await.unwrap();
        events.note.changed().await.unwrap();
        assert_eq!(*events.note.borrow_and_update(), Note::EMPTY);

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn declined_authentication_abandons_the_parked_save() {
        let dir = tempfile::tempdir().unwrap();
        let (keystore, controller, mut events) = controller(dir.path());
        keystore.record_authentication();

        controller.load().await.unwrap();
        events.note.changed().await.unwrap();

        keystore.clear_authentication();
        controller.save("never stored".to_string()).await.unwrap();
        assert_eq!(
            events.auth_required.recv().await.unwrap(),
            OperationKind::Save
        );
        controller.auth_declined(OperationKind::Save).await.unwrap();

        // After re-authenticating, a load sees no trace of the
        // abandoned save.
        keystore.record_authentication();
        controller.load().await.unwrap();
        events.note.changed().await.unwrap();
        assert_eq!(*events.note.borrow_and_update(), Note::EMPTY);

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn newer_save_replaces_a_parked_one() {
        let dir = tempfile::tempdir().unwrap();
        let (keystore, controller, mut events) = controller(dir.path());
        keystore.record_authentication();

        controller.load().await.unwrap();
        events.note.changed().await.unwrap();

        keystore.clear_authentication();
        controller.save("stale".to_string()).await.unwrap();
        assert_eq!(
            events.auth_required.recv().await.unwrap(),
            OperationKind::Save
        );

        keystore.record_authentication();
        controller.save("fresh".to_string()).await.unwrap();
        let saved = events.saved.recv().await.unwrap();
        assert_eq!(saved.content(), Some("fresh"));

        // Confirming the old park must not resurrect "stale": the newer
        // attempt consumed the slot.
        controller.auth_confirmed(OperationKind::Save).await.unwrap();
        controller.load().await.unwrap();
        events.note.changed().await.unwrap();
        assert_eq!(events.note.borrow_and_update().content(), Some("fresh"));

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn non_auth_failures_are_terminal_problems() {
        let dir = tempfile::tempdir().unwrap();
        let keystore = Arc::new(SoftwareKeyStore::open(dir.path().join("keys")).unwrap());
        keystore.record_authentication();
        let secrets = SecretStore::new(
            Arc::clone(&keystore) as Arc<dyn DeviceKeyStore>,
            dir.path().join("passphrase.bin"),
            "note-key",
            AUTH_WINDOW,
        );

        // Corrupt container: too short to hold an IV and one cipher block.
        std::fs::write(dir.path().join("passphrase.bin"), b"short").unwrap();

        let (controller, mut events) =
            NoteController::spawn(secrets, dir.path().join("note.db"));
        controller.load().await.unwrap();

        let problem = events.problems.recv().await.unwrap();
        assert!(matches!(problem, NotelockError::MalformedSecret(_)));

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn outcomes_are_consumed_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        let (keystore, controller, mut events) = controller(dir.path());
        keystore.record_authentication();

        controller.load().await.unwrap();
        events.note.changed().await.unwrap();
        controller.save("only once".to_string()).await.unwrap();

        let first = events.saved.recv().await.unwrap();
        assert_eq!(first.content(), Some("only once"));

        // The confirmation was moved out above; nothing is redelivered.
        controller.shutdown().await.unwrap();
        assert!(events.saved.recv().await.is_none());
        assert!(events.auth_required.recv().await.is_none());
        assert!(events.problems.recv().await.is_none());
    }
}
