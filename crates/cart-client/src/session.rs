//! Session storage backends.
//!
//! - [`MemorySessionStorage`] lives as long as the process, the way a browser
//!   tab's session storage lives as long as the tab.
//! - [`FileSessionStorage`] reads a JSON object from disk on every lookup, so
//!   a token written by a separate login step is picked up without restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use tracing::warn;

use crate::ports::{ACCESS_TOKEN_KEY, SessionStorage};

/// Errors that can occur when reading a session file.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The file exists but could not be read.
    #[error("Failed to read session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON object.
    #[error("Malformed session file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage already holding an access token.
    #[must_use]
    pub fn with_access_token(token: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.insert(ACCESS_TOKEN_KEY, token);
        storage
    }

    /// Store a value, replacing any previous one.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Remove a value, returning it if it was present.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Drop every entry (session end).
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Session storage backed by a JSON file such as `{"accessToken": "..."}`.
///
/// Every lookup is a small synchronous read on the calling thread, including
/// when the client calls it from inside an async operation. That is fine for
/// a session file on local disk. Prefer [`MemorySessionStorage`] when the
/// file may sit on a slow or network filesystem.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Use the session file at `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every string entry from the file.
    ///
    /// A missing file is an empty session. Non-string values are skipped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` if the file cannot be read and
    /// `SessionError::Malformed` if it is not a JSON object.
    pub fn load(&self) -> Result<HashMap<String, String>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let entries: HashMap<String, serde_json::Value> =
            serde_json::from_str(&raw).map_err(|source| SessionError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect())
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }
}
