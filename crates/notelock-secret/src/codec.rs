// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reversible passphrase <-> bytes conversion with zeroizing buffers.
//!
//! Both directions return ownership of any secret-bearing buffer they
//! produce: the byte form comes back in a [`Zeroizing`] vector, the text
//! form inside a [`Passphrase`]. Buffers owned by this module never outlive
//! the call unwiped, on success or failure. Caller-supplied slices are NOT
//! wiped here -- the caller owns them and carries the wiping responsibility
//! (which is why [`passphrase_from_bytes`] takes a borrowed slice rather
//! than pretending to consume it).

use notelock_core::NotelockError;
use zeroize::Zeroizing;

use crate::passphrase::{ALPHABET, PASSPHRASE_LEN, Passphrase};

/// Encode the passphrase as UTF-8 bytes in a wiped-on-drop buffer.
pub fn passphrase_to_bytes(passphrase: &Passphrase) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(passphrase.expose_secret().as_bytes().to_vec())
}

/// Decode UTF-8 bytes back into a passphrase.
///
/// Fails with [`NotelockError::MalformedSecret`] when the bytes are not
/// valid UTF-8, have the wrong length, or contain symbols outside the
/// base-36 alphabet -- any of which means the decrypted container did not
/// hold a passphrase this system generated.
pub fn passphrase_from_bytes(bytes: &[u8]) -> Result<Passphrase, NotelockError> {
    let text = std::str::from_utf8(bytes).map_err(|_| {
        NotelockError::MalformedSecret("decrypted passphrase is not valid UTF-8".to_string())
    })?;

    if text.len() != PASSPHRASE_LEN {
        return Err(NotelockError::MalformedSecret(format!(
            "decrypted passphrase has length {}, expected {PASSPHRASE_LEN}",
            text.len()
        )));
    }

    if !text.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err(NotelockError::MalformedSecret(
            "decrypted passphrase contains symbols outside the base-36 alphabet".to_string(),
        ));
    }

    // Preallocated copy: the String buffer moves into the passphrase wrapper
    // without reallocating, so no stale copy is left behind.
    let mut symbols = String::with_capacity(text.len());
    symbols.push_str(text);
    Ok(Passphrase::from_validated(symbols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_law() {
        for _ in 0..8 {
            let passphrase = Passphrase::generate();
            let bytes = passphrase_to_bytes(&passphrase);
            let back = passphrase_from_bytes(&bytes).unwrap();
            assert_eq!(back.expose_secret(), passphrase.expose_secret());
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        let mut bytes = vec![b'a'; PASSPHRASE_LEN];
        bytes[0] = 0xff;
        assert!(matches!(
            passphrase_from_bytes(&bytes),
            Err(NotelockError::MalformedSecret(_))
        ));
    }

    #[test]
    fn rejects_wrong_length() {
        let bytes = vec![b'a'; PASSPHRASE_LEN - 1];
        assert!(matches!(
            passphrase_from_bytes(&bytes),
            Err(NotelockError::MalformedSecret(_))
        ));
    }

    #[test]
    fn rejects_symbols_outside_the_alphabet() {
        let mut bytes = vec![b'a'; PASSPHRASE_LEN];
        bytes[64] = b'A';
        assert!(matches!(
            passphrase_from_bytes(&bytes),
            Err(NotelockError::MalformedSecret(_))
        ));
    }
}
