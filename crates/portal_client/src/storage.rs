//! Durable client-local storage for the session.
//!
//! Two string entries are kept: the bearer credential and the serialized
//! session. Only the session manager writes them; the gateway reads the
//! credential.

use std::{
    collections::HashMap,
    fs::{create_dir_all, read_to_string, remove_file, File},
    io::{ErrorKind, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use log::debug;
use portal_core::Session;

use crate::error::{ClientError, Result};

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_DATA_KEY: &str = "user_data";

/// String key/value storage with localStorage semantics.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        match read_to_string(&path) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        create_dir_all(&self.dir)?;
        let mut file = File::create(self.entry_path(key))?;
        file.write_all(value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Typed view over the two session entries.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.inner.get(AUTH_TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.inner.set(AUTH_TOKEN_KEY, token)
    }

    /// Raw serialized session, if any. Parsing is left to the caller so a
    /// corrupt entry can be told apart from a missing one.
    pub fn raw_session(&self) -> Result<Option<String>> {
        self.inner.get(USER_DATA_KEY)
    }

    pub fn save(&self, token: &str, session: &Session) -> Result<()> {
        let serialized =
            serde_json::to_string(session).map_err(|e| ClientError::Storage(e.to_string()))?;
        self.inner.set(AUTH_TOKEN_KEY, token)?;
        self.inner.set(USER_DATA_KEY, &serialized)
    }

    pub fn clear(&self) -> Result<()> {
        debug!("Clearing stored session entries");
        self.inner.remove(AUTH_TOKEN_KEY)?;
        self.inner.remove(USER_DATA_KEY)
    }
}
