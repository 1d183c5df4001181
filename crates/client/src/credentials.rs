//! Durable credential slot.
//!
//! One JSON file per user profile holds the bearer token, the optional
//! refresh token, and the serialized user record. The three always move
//! together: they are stored together on login and cleared together on
//! logout or authorization failure - a partial clear is never valid.
//!
//! The file is read once when the store is opened; afterwards every read is
//! served from memory so token lookups on the request path never touch the
//! filesystem. A corrupt file is treated as absent and removed.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::User;

/// Errors raised by the credential slot.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Reading or writing the slot failed.
    #[error("credential file error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("credential encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The record held in the durable slot.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

/// Durable, per-profile key/value slot for the session credential.
///
/// Cloning yields another handle onto the same slot.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<CredentialStoreInner>,
}

#[derive(Debug)]
struct CredentialStoreInner {
    path: PathBuf,
    cached: RwLock<Option<StoredCredentials>>,
}

impl CredentialStore {
    /// Open the slot at `path`, reading any existing record into memory.
    ///
    /// A missing file yields an empty slot. A corrupt file is logged,
    /// removed, and likewise yields an empty slot, so a damaged credential
    /// can never produce a half-authenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error only when the file exists but cannot be read.
    pub fn open(path: PathBuf) -> Result<Self, CredentialStoreError> {
        let cached = match std::fs::read(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
            Ok(bytes) => match serde_json::from_slice::<StoredCredentials>(&bytes) {
                Ok(creds) => Some(creds),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "stored credential is corrupt; discarding it"
                    );
                    let _ = std::fs::remove_file(&path);
                    None
                }
            },
        };

        Ok(Self {
            inner: Arc::new(CredentialStoreInner {
                path,
                cached: RwLock::new(cached),
            }),
        })
    }

    /// The full stored record, if any.
    #[must_use]
    pub fn get(&self) -> Option<StoredCredentials> {
        self.read_cache().clone()
    }

    /// The bearer token, if a session is stored.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read_cache()
            .as_ref()
            .map(|c| SecretString::from(c.access_token.clone()))
    }

    /// The refresh token, if the backend issued one.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read_cache().as_ref().and_then(|c| c.refresh_token.clone())
    }

    /// The stored user record, if a session is stored.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read_cache().as_ref().map(|c| c.user.clone())
    }

    /// Persist a record, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written; the
    /// in-memory copy is only updated after the file write succeeds.
    pub fn store(&self, credentials: StoredCredentials) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&credentials)?;
        std::fs::write(&self.inner.path, bytes)?;

        *self.write_cache() = Some(credentials);
        Ok(())
    }

    /// Remove the stored record - token, refresh token, and user together.
    ///
    /// Clearing an already-empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists and cannot be removed; the
    /// in-memory copy is dropped regardless, so the process never keeps
    /// using a credential it was told to discard.
    pub fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.write_cache() = None;

        match std::fs::remove_file(&self.inner.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, Option<StoredCredentials>> {
        // Lock poisoning can only come from a panic mid-read/write of a
        // plain Option; the value itself is still coherent.
        self.inner
            .cached
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, Option<StoredCredentials>> {
        self.inner
            .cached
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use vitrine_core::UserId;

    fn sample_user() -> User {
        User {
            id: UserId::new(7),
            username: "a@b.com".to_owned(),
            email: Some("a@b.com".parse().unwrap()),
            first_name: None,
            last_name: None,
            roles: vec!["ADMIN".to_owned()],
            permissions: None,
        }
    }

    fn sample_credentials() -> StoredCredentials {
        StoredCredentials {
            access_token: "T1".to_owned(),
            refresh_token: None,
            user: sample_user(),
        }
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("credentials.json")).unwrap();
        assert!(store.get().is_none());
        assert!(store.token().is_none());
    }

    #[test]
    fn test_store_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = CredentialStore::open(path.clone()).unwrap();
        store.store(sample_credentials()).unwrap();

        let reopened = CredentialStore::open(path).unwrap();
        assert_eq!(
            reopened.token().unwrap().expose_secret(),
            "T1"
        );
        assert_eq!(reopened.user().unwrap().id, UserId::new(7));
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = CredentialStore::open(path.clone()).unwrap();
        assert!(store.get().is_none());
        // The damaged file is gone, not left around to fail again
        assert!(!path.exists());
    }

    #[test]
    fn test_clear_removes_everything_together() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = CredentialStore::open(path.clone()).unwrap();
        store.store(sample_credentials()).unwrap();
        store.clear().unwrap();

        assert!(store.token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(store.user().is_none());
        assert!(!path.exists());

        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", sample_credentials());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("T1"));
    }
}
