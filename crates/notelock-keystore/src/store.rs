// SPDX-FileCopyrightText: 2026 Notelock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Software-backed [`DeviceKeyStore`].
//!
//! Keys live for the install lifetime in a keystore directory, one file per
//! logical key name. Key material is loaded into wiped-on-drop buffers and
//! is never handed out through the API: callers get encrypt/decrypt, not
//! bytes. The recent-authentication window is process-local state --
//! a fresh process starts locked until [`record_authentication`] is called.
//!
//! [`record_authentication`]: SoftwareKeyStore::record_authentication

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use notelock_core::{DeviceKeyStore, Iv, NotelockError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::{Zeroize, Zeroizing};

use crate::cipher;

/// On-disk representation of one key.
///
/// The key bytes are plaintext on disk -- this store is the software stand-in
/// for a hardware-backed store, and protecting its directory is the
/// platform's job (see the crate docs on the trust boundary).
#[derive(Serialize, Deserialize)]
struct KeyFile {
    algorithm: String,
    auth_timeout_secs: u64,
    key: Vec<u8>,
}

const KEY_ALGORITHM: &str = "aes-256-cbc";

struct StoredKey {
    key: Zeroizing<[u8; 32]>,
    auth_timeout: Duration,
}

/// A file-backed key store gating every cipher operation on a recent user
/// authentication.
pub struct SoftwareKeyStore {
    dir: PathBuf,
    keys: Mutex<HashMap<String, StoredKey>>,
    last_auth: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for SoftwareKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareKeyStore")
            .field("dir", &self.dir)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl SoftwareKeyStore {
    /// Open (creating if needed) the keystore directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, NotelockError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "keystore opened");
        Ok(Self {
            dir,
            keys: Mutex::new(HashMap::new()),
            last_auth: Mutex::new(None),
        })
    }

    fn key_path(&self, name: &str) -> Result<PathBuf, NotelockError> {
        // Key names become file names; refuse anything that could escape
        // the keystore directory.
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(NotelockError::KeyUnavailable(format!(
                "invalid key name `{name}`"
            )));
        }
        Ok(self.dir.join(format!("{name}.key.json")))
    }

    fn load_key_file(path: &Path) -> Result<StoredKey, NotelockError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| NotelockError::KeyUnavailable(format!("cannot read key file: {e}")))?;
        let mut parsed: KeyFile = serde_json::from_str(&raw)
            .map_err(|e| NotelockError::KeyUnavailable(format!("corrupt key file: {e}")))?;

        if parsed.algorithm != KEY_ALGORITHM {
            parsed.key.zeroize();
            return Err(NotelockError::KeyUnavailable(format!(
                "unsupported key algorithm `{}`",
                parsed.algorithm
            )));
        }

        let mut key = Zeroizing::new([0u8; 32]);
        if parsed.key.len() != key.len() {
            parsed.key.zeroize();
            return Err(NotelockError::KeyUnavailable(
                "corrupt key file: wrong key length".to_string(),
            ));
        }
        key.copy_from_slice(&parsed.key);
        parsed.key.zeroize();

        Ok(StoredKey {
            key,
            auth_timeout: Duration::from_secs(parsed.auth_timeout_secs),
        })
    }

    fn write_key_file(path: &Path, stored: &StoredKey) -> Result<(), NotelockError> {
        let file = KeyFile {
            algorithm: KEY_ALGORITHM.to_string(),
            auth_timeout_secs: stored.auth_timeout.as_secs(),
            key: stored.key.to_vec(),
        };
        let mut json = serde_json::to_string(&file)
            .map_err(|e| NotelockError::KeyUnavailable(format!("cannot encode key file: {e}")))?;
        let result = fs::write(path, &json);
        json.zeroize();
        result.map_err(|e| NotelockError::KeyUnavailable(format!("cannot write key file: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .map_err(|e| NotelockError::KeyUnavailable(format!("cannot chmod key file: {e}")))?;
        }

        Ok(())
    }

    /// Fetch the named key into the in-memory map, loading it from disk if
    /// this process has not touched it yet.
    fn with_key<T>(
        &self,
        name: &str,
        f: impl FnOnce(&StoredKey) -> Result<T, NotelockError>,
    ) -> Result<T, NotelockError> {
        let path = self.key_path(name)?;
        let mut keys = self.lock_keys()?;
        if !keys.contains_key(name) {
            if !path.exists() {
                return Err(NotelockError::KeyUnavailable(format!(
                    "no key named `{name}`"
                )));
            }
            keys.insert(name.to_string(), Self::load_key_file(&path)?);
        }
        // Entry is present; the map is only mutated under this lock.
        let stored = keys
            .get(name)
            .ok_or_else(|| NotelockError::Internal("key vanished under lock".to_string()))?;
        f(stored)
    }

    fn lock_keys(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredKey>>, NotelockError> {
        self.keys
            .lock()
            .map_err(|_| NotelockError::Internal("keystore mutex poisoned".to_string()))
    }

    fn check_window(&self, auth_timeout: Duration) -> Result<(), NotelockError> {
        let last = self
            .last_auth
            .lock()
            .map_err(|_| NotelockError::Internal("keystore mutex poisoned".to_string()))?;
        match *last {
            Some(at) if at.elapsed() <= auth_timeout => Ok(()),
            _ => Err(NotelockError::AuthenticationRequired),
        }
    }
}

impl DeviceKeyStore for SoftwareKeyStore {
    fn ensure_key(&self, name: &str, auth_timeout: Duration) -> Result<(), NotelockError> {
        let path = self.key_path(name)?;
        let mut keys = self.lock_keys()?;

        if keys.contains_key(name) {
            return Ok(());
        }
        if path.exists() {
            keys.insert(name.to_string(), Self::load_key_file(&path)?);
            return Ok(());
        }

        let stored = StoredKey {
            key: cipher::generate_key(),
            auth_timeout,
        };
        Self::write_key_file(&path, &stored)?;
        keys.insert(name.to_string(), stored);
        info!(name = %name, timeout_secs = auth_timeout.as_secs(), "device key created");
        Ok(())
    }

    fn encrypt(&self, name: &str, plaintext: &[u8]) -> Result<(Iv, Vec<u8>), NotelockError> {
        self.with_key(name, |stored| {
            self.check_window(stored.auth_timeout)?;
            cipher::encrypt(&stored.key, plaintext)
        })
    }

    fn decrypt(
        &self,
        name: &str,
        iv: &Iv,
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, NotelockError> {
        self.with_key(name, |stored| {
            self.check_window(stored.auth_timeout)?;
            cipher::decrypt(&stored.key, iv, ciphertext)
        })
    }

    fn record_authentication(&self) {
        if let Ok(mut last) = self.last_auth.lock() {
            *last = Some(Instant::now());
            debug!("authentication recorded, key window open");
        }
    }

    fn clear_authentication(&self) {
        if let Ok(mut last) = self.last_auth.lock() {
            *last = None;
            debug!("authentication cleared, key window closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_secs(60);

    fn open_store(dir: &Path) -> SoftwareKeyStore {
        SoftwareKeyStore::open(dir).unwrap()
    }

    #[test]
    fn ensure_key_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        store.record_authentication();

        store.ensure_key("note-key", TIMEOUT).unwrap();
        let (iv, ct) = store.encrypt("note-key", b"probe").unwrap();

        // A second ensure must not rotate: the old ciphertext still decrypts.
        store.ensure_key("note-key", TIMEOUT).unwrap();
        let pt = store.decrypt("note-key", &iv, &ct).unwrap();
        assert_eq!(pt.as_slice(), b"probe");
    }

    #[test]
    fn keys_survive_reopening_the_store() {
        let dir = tempdir().unwrap();
        let (iv, ct) = {
            let store = open_store(dir.path());
            store.record_authentication();
            store.ensure_key("note-key", TIMEOUT).unwrap();
            store.encrypt("note-key", b"across restarts").unwrap()
        };

        // New store instance simulates a process restart: the key persists
        // but the authentication window does not.
        let store = open_store(dir.path());
        assert!(matches!(
            store.decrypt("note-key", &iv, &ct),
            Err(NotelockError::AuthenticationRequired)
        ));

        store.record_authentication();
        let pt = store.decrypt("note-key", &iv, &ct).unwrap();
        assert_eq!(pt.as_slice(), b"across restarts");
    }

    #[test]
    fn operations_fail_before_first_authentication() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        store.ensure_key("note-key", TIMEOUT).unwrap();

        assert!(matches!(
            store.encrypt("note-key", b"x"),
            Err(NotelockError::AuthenticationRequired)
        ));
    }

    #[test]
    fn clear_authentication_closes_the_window() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        store.record_authentication();
        store.ensure_key("note-key", TIMEOUT).unwrap();
        let (iv, ct) = store.encrypt("note-key", b"x").unwrap();

        store.clear_authentication();
        assert!(matches!(
            store.decrypt("note-key", &iv, &ct),
            Err(NotelockError::AuthenticationRequired)
        ));
    }

    #[test]
    fn lapsed_window_is_authentication_required_not_generic() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        store.ensure_key("note-key", Duration::ZERO).unwrap();
        // A zero timeout lapses immediately after authentication.
        store.record_authentication();
        std::thread::sleep(Duration::from_millis(5));

        let err = store.encrypt("note-key", b"x").unwrap_err();
        assert!(err.is_authentication_required(), "got: {err}");
    }

    #[test]
    fn missing_key_is_key_unavailable() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        store.record_authentication();

        assert!(matches!(
            store.encrypt("never-created", b"x"),
            Err(NotelockError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn corrupt_key_file_is_key_unavailable() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.key.json"), "not json").unwrap();
        let store = open_store(dir.path());
        store.record_authentication();

        assert!(matches!(
            store.encrypt("broken", b"x"),
            Err(NotelockError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn key_names_cannot_escape_the_directory() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        assert!(matches!(
            store.ensure_key("../evil", TIMEOUT),
            Err(NotelockError::KeyUnavailable(_))
        ));
        assert!(matches!(
            store.ensure_key("", TIMEOUT),
            Err(NotelockError::KeyUnavailable(_))
        ));
    }
}
