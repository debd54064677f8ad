// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Software device key store for notelock.
//!
//! Implements the [`DeviceKeyStore`] trait from notelock-core: AES-256 keys
//! created lazily per logical name, persisted for the install lifetime, and
//! usable only within a recent-authentication window.
//!
//! # Trust boundary
//!
//! On Android or iOS this role is played by a hardware-backed store whose
//! key material never enters the application process. This crate is the
//! software stand-in behind the same trait: keys are non-exportable through
//! the API, but live in files the platform must protect. Defending the
//! keystore directory against a root-level compromise is out of scope.
//!
//! [`DeviceKeyStore`]: notelock_core::DeviceKeyStore

pub mod cipher;
pub mod store;

pub use store::SoftwareKeyStore;
