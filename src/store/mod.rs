//! Durable key-value storage for session state.
//!
//! A single JSON file maps string keys to string values. Reads are
//! failure-tolerant: a missing or corrupt file behaves as an empty store and
//! is never surfaced to callers as an error. Writes go through to disk
//! before the call returns.
//!
//! All access is funneled through one mutex, so each read-modify-write
//! completes before the next operation starts.

pub mod credentials;

pub use credentials::{Credential, CredentialStore};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub struct KvStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl KvStore {
    /// Open the store at `path`, loading any persisted entries. A missing or
    /// unparseable file yields an empty store.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn read_entries(path: &Path) -> HashMap<String, String> {
        let Ok(contents) = fs::read_to_string(path) else {
            return HashMap::new();
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("discarding corrupt store file {}: {err}", path.display());
                HashMap::new()
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// # Errors
    /// Returns an error if the store file cannot be written.
    pub fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    /// Remove `key` if present. Removing an absent key is a no-op.
    ///
    /// # Errors
    /// Returns an error if the store file cannot be written.
    pub fn remove(&self, key: &str) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }

    fn flush(&self, entries: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        fs::write(&self.path, contents)?;
        debug!("persisted {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}
