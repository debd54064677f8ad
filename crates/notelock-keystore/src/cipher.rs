// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-CBC/PKCS7 operations.
//!
//! Every call to [`encrypt`] generates a fresh random 16-byte IV via the
//! system CSPRNG. IV reuse under CBC leaks plaintext prefixes, so the IV is
//! never supplied by the caller on the encrypt path.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use notelock_core::{Iv, NotelockError};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypt plaintext with AES-256-CBC and PKCS7 padding under a random IV.
///
/// Returns `(iv, ciphertext)`; the caller must keep both to decrypt later.
pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<(Iv, Vec<u8>), NotelockError> {
    let mut iv: Iv = Default::default();
    OsRng.fill_bytes(&mut iv);

    let ciphertext =
        Aes256CbcEnc::new(key.into(), (&iv).into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok((iv, ciphertext))
}

/// Decrypt AES-256-CBC/PKCS7 ciphertext.
///
/// The plaintext comes back in a wiped-on-drop buffer. Fails if the
/// ciphertext is not block-aligned or the padding does not verify (wrong
/// key or tampered data).
pub fn decrypt(
    key: &[u8; 32],
    iv: &Iv,
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, NotelockError> {
    let plaintext = Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| {
            NotelockError::KeyUnavailable(
                "AES-256-CBC decryption failed -- wrong key or corrupted data".to_string(),
            )
        })?;

    Ok(Zeroizing::new(plaintext))
}

/// Generate a random 32-byte key suitable for AES-256-CBC.
pub fn generate_key() -> Zeroizing<[u8; 32]> {
    let mut key = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(&mut key[..]);
    key
}
