// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The note value type and the operation kinds the controller retries.

/// The single user note.
///
/// Immutable value: a save produces a new `Note` carrying the identity the
/// storage layer assigned. The sentinel id `-1` means "not yet persisted";
/// the repository uses it to decide between insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    id: i64,
    content: Option<String>,
}

impl Note {
    /// Sentinel id for a note that has never been persisted.
    pub const EMPTY_ID: i64 = -1;

    /// The "no note persisted yet" sentinel.
    pub const EMPTY: Note = Note {
        id: Self::EMPTY_ID,
        content: None,
    };

    /// A note as loaded from or assigned by the storage layer.
    pub fn persisted(id: i64, content: Option<String>) -> Self {
        Note { id, content }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// True once the storage layer has assigned this note an identity.
    pub fn is_persisted(&self) -> bool {
        self.id != Self::EMPTY_ID
    }
}

/// Which controller operation a retry signal refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Load,
    Save,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Load => write!(f, "load"),
            OperationKind::Save => write!(f, "save"),
        }
    }
}
