// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted single-note persistence for notelock.
//!
//! An SQLCipher database keyed by the storage [`Passphrase`] holds at most
//! one note row. Schema changes ship as embedded refinery migrations and
//! run on every open.
//!
//! [`Passphrase`]: notelock_secret::Passphrase

mod database;
mod migrations;
mod repository;

pub use repository::NoteRepository;
