// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase lifecycle for notelock.
//!
//! A random 128-symbol passphrase is the note store's encryption key. This
//! crate generates it, converts it to and from bytes with wiped buffers,
//! and keeps it encrypted at rest in a single-file container protected by
//! the device-bound key.

pub mod codec;
pub mod passphrase;
pub mod store;

pub use passphrase::{ALPHABET, PASSPHRASE_LEN, Passphrase};
pub use store::SecretStore;
