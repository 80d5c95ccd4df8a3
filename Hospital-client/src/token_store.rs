//! Persistent storage for the bearer token

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where the client keeps its token between requests
pub trait TokenStore: Send + Sync {
    /// The current token, if any
    fn get(&self) -> Option<String>;

    fn set(&self, token: &str) -> std::io::Result<()>;

    fn clear(&self) -> std::io::Result<()>;
}

/// Token held for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, token: &str) -> std::io::Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "token lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "token lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// Token persisted as a small JSON file, read on every request
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cannot read token file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<StoredToken>(&raw) {
            Ok(stored) if !stored.token.is_empty() => Some(stored.token),
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring malformed token file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec(&StoredToken {
            token: token.to_string(),
        })?;
        fs::write(&self.path, json)?;
        debug!("Stored token at {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);

        store.set("abc").unwrap();
        assert_eq!(store.get().as_deref(), Some("abc"));

        store.clear().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");

        FileTokenStore::new(&path).set("persisted").unwrap();
        assert_eq!(FileTokenStore::new(&path).get().as_deref(), Some("persisted"));

        FileTokenStore::new(&path).clear().unwrap();
        assert_eq!(FileTokenStore::new(&path).get(), None);
        // Clearing twice is fine
        FileTokenStore::new(&path).clear().unwrap();
    }

    #[test]
    fn test_malformed_file_reads_as_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(FileTokenStore::new(&path).get(), None);
    }
}
