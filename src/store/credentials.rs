//! Credential persistence with one-time legacy key migration.
//!
//! The token historically landed under several different keys depending on
//! which build of the console wrote it. `admin_token` is canonical; the
//! legacy names are consulted in order and migrated exactly once.

use std::io;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::models::User;
use crate::store::KvStore;

pub const TOKEN_KEY: &str = "admin_token";
pub const USER_KEY: &str = "admin_user";

/// Deprecated token keys, in lookup order. Each is deleted once its value
/// has been copied to [`TOKEN_KEY`].
pub const LEGACY_TOKEN_KEYS: &[&str] = &["access_token", "auth_token", "token"];

#[derive(Clone, Debug, PartialEq)]
pub struct Credential {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<KvStore>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    /// Current bearer token, if any. Looks up the canonical key first and
    /// falls back to the legacy keys, migrating on a hit. Idempotent: once
    /// the canonical key is populated, repeated calls change nothing.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        if let Some(token) = self.kv.get(TOKEN_KEY) {
            return Some(token);
        }

        for key in LEGACY_TOKEN_KEYS {
            let Some(token) = self.kv.get(key) else {
                continue;
            };
            debug!("migrating token from legacy key {key}");
            if let Err(err) = self.kv.set(TOKEN_KEY, &token) {
                error!("failed to migrate token to canonical key: {err}");
            } else if let Err(err) = self.kv.remove(key) {
                error!("failed to remove legacy key {key}: {err}");
            }
            return Some(token);
        }

        None
    }

    /// Load the persisted credential, or `None` when nothing usable is
    /// stored. A user record that fails to parse clears the store and counts
    /// as "no credential".
    #[must_use]
    pub fn load(&self) -> Option<Credential> {
        let token = self.token()?;
        let raw_user = self.kv.get(USER_KEY)?;

        match serde_json::from_str(&raw_user) {
            Ok(user) => Some(Credential { token, user }),
            Err(err) => {
                warn!("stored user record is corrupt, discarding credential: {err}");
                self.clear();
                None
            }
        }
    }

    /// Persist `token` and `user` under the canonical keys, replacing any
    /// prior value.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn save(&self, token: &str, user: &User) -> io::Result<()> {
        let raw_user = serde_json::to_string(user)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.kv.set(TOKEN_KEY, token)?;
        self.kv.set(USER_KEY, &raw_user)
    }

    /// Delete both canonical keys. Legacy keys were already deleted at
    /// migration time, so they are not touched here. Never fails: write
    /// errors are logged and the in-memory state is still cleared.
    pub fn clear(&self) {
        if let Err(err) = self.kv.remove(TOKEN_KEY) {
            error!("failed to clear token: {err}");
        }
        if let Err(err) = self.kv.remove(USER_KEY) {
            error!("failed to clear user: {err}");
        }
    }
}
