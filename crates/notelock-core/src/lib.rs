// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for notelock.
//!
//! Defines the error taxonomy, the [`Note`] value type, and the
//! [`DeviceKeyStore`] trait implemented by the keystore crate. Everything
//! else in the workspace builds on these seams.

pub mod error;
pub mod keystore;
pub mod note;

pub use error::NotelockError;
pub use keystore::{BLOCK_SIZE, DeviceKeyStore, Iv};
pub use note::{Note, OperationKind};
