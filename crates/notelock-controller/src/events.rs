// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcome channels handed to the UI layer.
//!
//! The three mpsc receivers are one-shot in the consumption sense: a
//! received value is moved out and can never be observed again, even by a
//! consumer constructed later. The watch receiver is the opposite, a
//! continuously observable current-note value.

use notelock_core::{Note, NotelockError, OperationKind};
use tokio::sync::{mpsc, watch};

/// Receiving half of the controller's UI contract.
pub struct NoteEvents {
    /// Which parked operation needs a fresh user authentication to resume.
    pub auth_required: mpsc::UnboundedReceiver<OperationKind>,

    /// Terminal failures. Anything arriving here is not retryable.
    pub problems: mpsc::UnboundedReceiver<NotelockError>,

    /// Save confirmations, carrying the note as persisted.
    pub saved: mpsc::UnboundedReceiver<Note>,

    /// The current note. Starts at [`Note::EMPTY`] and tracks every
    /// successful load and save.
    pub note: watch::Receiver<Note>,
}

/// Sending half, owned by the worker task.
pub(crate) struct EventSinks {
    pub(crate) auth_required: mpsc::UnboundedSender<OperationKind>,
    pub(crate) problems: mpsc::UnboundedSender<NotelockError>,
    pub(crate) saved: mpsc::UnboundedSender<Note>,
    pub(crate) note: watch::Sender<Note>,
}

pub(crate) fn channel() -> (EventSinks, NoteEvents) {
    let (auth_tx, auth_rx) = mpsc::unbounded_channel();
    let (problem_tx, problem_rx) = mpsc::unbounded_channel();
    let (saved_tx, saved_rx) = mpsc::unbounded_channel();
    let (note_tx, note_rx) = watch::channel(Note::EMPTY);

    (
        EventSinks {
            auth_required: auth_tx,
            problems: problem_tx,
            saved: saved_tx,
            note: note_tx,
        },
        NoteEvents {
            auth_required: auth_rx,
            problems: problem_rx,
            saved: saved_rx,
            note: note_rx,
        },
    )
}
