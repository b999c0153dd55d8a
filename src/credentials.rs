//! Credential cache for the client shell.
//!
//! The shell remembers the broker API key, client id and (optionally) the
//! MPIN between runs. TOTP codes and session tokens are never stored.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::constants::CREDENTIALS_KEY;
use crate::error::{ProxyError, Result};

/// What the shell persists between runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    pub api_key: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpin: Option<String>,
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("mpin", &self.mpin.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Load, save and clear the cached credentials.
pub trait CredentialStore {
    /// The cached credentials, or `None` if nothing usable is stored.
    fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Replace whatever is stored with `creds`.
    fn save(&self, creds: &StoredCredentials) -> Result<()>;

    /// Remove the cached credentials. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// Stores credentials as `angel_one_credentials.json` in a directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{CREDENTIALS_KEY}.json")),
        }
    }

    /// Full path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(creds) => Ok(Some(creds)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable credential file");
                Ok(None)
            }
        }
    }

    fn save(&self, creds: &StoredCredentials) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(creds)?)?;
        tracing::debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store, for tests and one-off sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(creds: StoredCredentials) -> Self {
        Self {
            inner: Mutex::new(Some(creds)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredCredentials>>> {
        self.inner
            .lock()
            .map_err(|_| ProxyError::Internal("credential store lock poisoned".into()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, creds: &StoredCredentials) -> Result<()> {
        *self.lock()? = Some(creds.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
