// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The encrypted secret container: load-or-create orchestration for the
//! storage passphrase.
//!
//! On-disk layout is a single file of `IV || ciphertext`, where the IV is
//! one cipher block and the ciphertext is the AES-CBC/PKCS7 encryption of
//! the UTF-8 passphrase bytes under the device-bound key. The file is
//! written atomically (temp file + rename in the same directory) and is
//! never partially updated: it exists in full or not at all.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notelock_core::{BLOCK_SIZE, DeviceKeyStore, Iv, NotelockError};
use tracing::{debug, info};

use crate::codec;
use crate::passphrase::Passphrase;

/// Reads and writes the encrypted passphrase container.
pub struct SecretStore {
    keystore: Arc<dyn DeviceKeyStore>,
    path: PathBuf,
    key_name: String,
    auth_timeout: Duration,
}

impl SecretStore {
    pub fn new(
        keystore: Arc<dyn DeviceKeyStore>,
        path: impl Into<PathBuf>,
        key_name: impl Into<String>,
        auth_timeout: Duration,
    ) -> Self {
        Self {
            keystore,
            path: path.into(),
            key_name: key_name.into(),
            auth_timeout,
        }
    }

    /// Return the passphrase, creating key and container on first use.
    ///
    /// An [`NotelockError::AuthenticationRequired`] from the key store
    /// propagates unchanged -- it is the one failure the caller is expected
    /// to recover from by re-authenticating and calling again.
    pub fn load_or_create(&self) -> Result<Passphrase, NotelockError> {
        self.keystore.ensure_key(&self.key_name, self.auth_timeout)?;

        if self.path.exists() {
            self.load()
        } else {
            self.create()
        }
    }

    /// Generate a fresh passphrase, encrypt it, write the container, and
    /// return the plaintext that was just generated (never re-read from
    /// disk in the same call).
    fn create(&self) -> Result<Passphrase, NotelockError> {
        let passphrase = Passphrase::generate();

        let plaintext = codec::passphrase_to_bytes(&passphrase);
        let (iv, ciphertext) = self.keystore.encrypt(&self.key_name, &plaintext)?;
        drop(plaintext);

        self.write_container(&iv, &ciphertext)?;
        info!(path = %self.path.display(), "secret container created");
        Ok(passphrase)
    }

    fn load(&self) -> Result<Passphrase, NotelockError> {
        let raw = fs::read(&self.path)?;

        // IV plus at least one cipher block; anything shorter is a torn or
        // foreign file.
        if raw.len() < BLOCK_SIZE * 2 {
            return Err(NotelockError::MalformedSecret(format!(
                "secret container is {} bytes, expected at least {}",
                raw.len(),
                BLOCK_SIZE * 2
            )));
        }

        let mut iv: Iv = Default::default();
        iv.copy_from_slice(&raw[..BLOCK_SIZE]);

        let plaintext = self
            .keystore
            .decrypt(&self.key_name, &iv, &raw[BLOCK_SIZE..])?;
        debug!(path = %self.path.display(), "secret container decrypted");
        codec::passphrase_from_bytes(&plaintext)
    }

    fn write_container(&self, iv: &Iv, ciphertext: &[u8]) -> Result<(), NotelockError> {
        let parent = self.path.parent().ok_or_else(|| {
            NotelockError::Internal(format!(
                "secret container path `{}` has no parent directory",
                self.path.display()
            ))
        })?;
        fs::create_dir_all(parent)?;

        let mut container = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
        container.extend_from_slice(iv);
        container.extend_from_slice(ciphertext);

        // Write-then-rename in the same directory keeps the container
        // all-or-nothing even if the process dies mid-write.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &container)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notelock_keystore::SoftwareKeyStore;
    use tempfile::TempDir;

    const KEY_NAME: &str = "note-key";
    const TIMEOUT: Duration = Duration::from_secs(60);

    fn store_in(dir: &TempDir) -> (SecretStore, Arc<SoftwareKeyStore>) {
        let keystore = Arc::new(SoftwareKeyStore::open(dir.path().join("keys")).unwrap());
        let store = SecretStore::new(
            keystore.clone(),
            dir.path().join("secret.bin"),
            KEY_NAME,
            TIMEOUT,
        );
        (store, keystore)
    }

    #[test]
    fn creates_then_reloads_the_same_passphrase() {
        let dir = TempDir::new().unwrap();
        let (store, keystore) = store_in(&dir);
        keystore.record_authentication();

        let first = store.load_or_create().unwrap();
        let second = store.load_or_create().unwrap();
        assert_eq!(first.expose_secret(), second.expose_secret());
    }

    #[test]
    fn container_is_iv_then_ciphertext() {
        let dir = TempDir::new().unwrap();
        let (store, keystore) = store_in(&dir);
        keystore.record_authentication();

        store.load_or_create().unwrap();

        let raw = fs::read(dir.path().join("secret.bin")).unwrap();
        // 128 passphrase bytes pad to 144 under PKCS7, plus the 16-byte IV.
        assert_eq!(raw.len(), BLOCK_SIZE + 144);
    }

    #[test]
    fn lapsed_window_propagates_authentication_required() {
        let dir = TempDir::new().unwrap();
        let (store, keystore) = store_in(&dir);
        keystore.record_authentication();
        store.load_or_create().unwrap();

        keystore.clear_authentication();
        let err = store.load_or_create().unwrap_err();
        assert!(err.is_authentication_required(), "got: {err}");
    }

    #[test]
    fn creation_also_requires_authentication() {
        let dir = TempDir::new().unwrap();
        let (store, _keystore) = store_in(&dir);

        // Key creation succeeds without authentication, but the encrypt
        // call inside create() must fail closed.
        let err = store.load_or_create().unwrap_err();
        assert!(err.is_authentication_required(), "got: {err}");
        assert!(!dir.path().join("secret.bin").exists());
    }

    #[test]
    fn truncated_container_is_malformed() {
        let dir = TempDir::new().unwrap();
        let (store, keystore) = store_in(&dir);
        keystore.record_authentication();
        store.load_or_create().unwrap();

        fs::write(dir.path().join("secret.bin"), [0u8; 8]).unwrap();
        assert!(matches!(
            store.load_or_create(),
            Err(NotelockError::MalformedSecret(_))
        ));
    }

    #[test]
    fn container_holding_a_foreign_secret_is_malformed() {
        let dir = TempDir::new().unwrap();
        let (store, keystore) = store_in(&dir);
        keystore.record_authentication();

        // A well-formed container whose plaintext is not a passphrase:
        // decryption succeeds, decoding must fail.
        keystore.ensure_key(KEY_NAME, TIMEOUT).unwrap();
        let (iv, ciphertext) = keystore.encrypt(KEY_NAME, b"not a passphrase").unwrap();
        let mut raw = iv.to_vec();
        raw.extend_from_slice(&ciphertext);
        fs::write(dir.path().join("secret.bin"), &raw).unwrap();

        assert!(matches!(
            store.load_or_create(),
            Err(NotelockError::MalformedSecret(_))
        ));
    }
}
