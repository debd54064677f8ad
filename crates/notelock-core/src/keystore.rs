// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The device key store trait seam.
//!
//! A device-bound key never leaves the store: callers name a key and hand
//! over buffers, the store performs the cipher operation. Implementations
//! must report a lapsed authentication window as
//! [`NotelockError::AuthenticationRequired`] and every other fault as
//! [`NotelockError::KeyUnavailable`] so the retry protocol upstream can
//! tell the two apart.

use std::time::Duration;

use zeroize::Zeroizing;

use crate::error::NotelockError;

/// AES block size; the container IV has exactly this length.
pub const BLOCK_SIZE: usize = 16;

/// An initialization vector for one cipher call.
pub type Iv = [u8; BLOCK_SIZE];

/// A store of non-exportable symmetric keys gated on recent user
/// authentication.
///
/// All methods are blocking; callers run them off the async context.
pub trait DeviceKeyStore: Send + Sync {
    /// Create the key named `name` if it does not exist; no-op (never
    /// rotates) if it does. The key's usable window after an
    /// authentication is `auth_timeout`.
    fn ensure_key(&self, name: &str, auth_timeout: Duration) -> Result<(), NotelockError>;

    /// Encrypt `plaintext` under the named key with a fresh random IV.
    fn encrypt(&self, name: &str, plaintext: &[u8]) -> Result<(Iv, Vec<u8>), NotelockError>;

    /// Decrypt `ciphertext` under the named key and the given IV.
    ///
    /// The plaintext is returned in a wiped-on-drop buffer; ownership of the
    /// secret transfers to the caller.
    fn decrypt(
        &self,
        name: &str,
        iv: &Iv,
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, NotelockError>;

    /// Record that the user just authenticated, opening the usable window
    /// for every key in the store.
    fn record_authentication(&self);

    /// Close the usable window (device lock, or window expiry delivered by
    /// the platform).
    fn clear_authentication(&self);
}
