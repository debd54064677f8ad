// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The storage passphrase: a fixed-length random secret over a base-36
//! alphabet.
//!
//! The passphrase doubles as the note store's encryption key -- that is the
//! point of the design: the value protected by device authentication IS the
//! storage key. It exists only in memory, wrapped so it is wiped on drop,
//! and is never persisted in plaintext.

use rand::Rng;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};

/// Number of symbols in a generated passphrase.
pub const PASSPHRASE_LEN: usize = 128;

/// The 36-symbol alphabet: lowercase letters and digits.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// The storage-layer encryption key, held in a wiped-on-drop wrapper.
#[derive(Clone)]
pub struct Passphrase(SecretString);

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Passphrase").field(&"[REDACTED]").finish()
    }
}

impl Passphrase {
    /// Generate a fresh passphrase: 128 symbols drawn uniformly from the
    /// base-36 alphabet using the OS CSPRNG.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        // Preallocate so the buffer never reallocates mid-build; a stale
        // reallocated buffer would escape the zeroize-on-drop wrapper.
        let mut symbols = String::with_capacity(PASSPHRASE_LEN);
        for _ in 0..PASSPHRASE_LEN {
            let idx = rng.gen_range(0..ALPHABET.len());
            symbols.push(ALPHABET[idx] as char);
        }
        Passphrase(SecretString::from(symbols))
    }

    pub(crate) fn from_validated(symbols: String) -> Self {
        Passphrase(SecretString::from(symbols))
    }

    /// Expose the secret for immediate use (byte conversion or keying the
    /// note store). Never store or log the returned value.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_passphrase_has_fixed_length_and_alphabet() {
        let passphrase = Passphrase::generate();
        let exposed = passphrase.expose_secret();

        assert_eq!(exposed.len(), PASSPHRASE_LEN);
        assert!(exposed.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn two_generations_differ() {
        // 36^128 keyspace; a collision means the RNG is broken.
        let a = Passphrase::generate();
        let b = Passphrase::generate();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn debug_output_is_redacted() {
        let passphrase = Passphrase::generate();
        let debug = format!("{passphrase:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(passphrase.expose_secret()));
    }
}
