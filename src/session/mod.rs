//! Observable session state.
//!
//! The `(current_user, is_authenticated)` pair lives in a watch channel:
//! new subscribers see the latest value immediately and every change after
//! it. Both fields travel in one snapshot, so no observer can see a user
//! without the authenticated flag or vice versa.

use std::io;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::models::User;
use crate::store::CredentialStore;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub current_user: Option<User>,
    pub is_authenticated: bool,
}

#[derive(Clone)]
pub struct Session {
    store: CredentialStore,
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl Session {
    /// Build the session from whatever the credential store holds. Called
    /// once at process start; corrupt or absent credentials produce the
    /// logged-out state.
    #[must_use]
    pub fn initialize(store: CredentialStore) -> Self {
        let snapshot = match store.load() {
            Some(credential) => {
                debug!("restored session for {}", credential.user.email);
                SessionSnapshot {
                    current_user: Some(credential.user),
                    is_authenticated: true,
                }
            }
            None => SessionSnapshot::default(),
        };

        let (tx, _) = watch::channel(snapshot);
        Self {
            store,
            tx: Arc::new(tx),
        }
    }

    /// Subscribe to session changes. The receiver yields the current
    /// snapshot immediately and every subsequent change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().current_user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated
    }

    /// Persist the credential, then publish the authenticated snapshot.
    /// Subscribers observe the user and the flag as one update.
    ///
    /// # Errors
    /// Returns an error if the credential cannot be persisted; the session
    /// state is left unchanged in that case.
    pub fn set_authenticated(&self, user: User, token: &str) -> io::Result<()> {
        self.store.save(token, &user)?;
        self.tx.send_replace(SessionSnapshot {
            current_user: Some(user),
            is_authenticated: true,
        });
        Ok(())
    }

    /// Drop to the logged-out state and clear the persisted credential.
    /// Idempotent; last write wins when racing an in-flight update.
    pub fn clear(&self) {
        self.store.clear();
        self.tx.send_replace(SessionSnapshot::default());
    }

    /// Replace the cached user without touching the token. Used after a
    /// profile update.
    ///
    /// # Errors
    /// Returns an error if the updated user cannot be persisted.
    pub fn refresh_user(&self, user: User) -> io::Result<()> {
        if let Some(token) = self.store.token() {
            self.store.save(&token, &user)?;
        }
        self.tx.send_replace(SessionSnapshot {
            current_user: Some(user),
            is_authenticated: self.is_authenticated(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::credentials::{TOKEN_KEY, USER_KEY};
    use crate::store::KvStore;
    use tempfile::TempDir;

    fn test_user(name: &str) -> User {
        User {
            id: Some("u1".to_string()),
            name: name.to_string(),
            email: "ana@example.com".to_string(),
            app_id: Some("1".to_string()),
            area: None,
            enabled: Some(true),
            last_login: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn session_in(dir: &TempDir) -> (Arc<KvStore>, Session) {
        let kv = Arc::new(KvStore::open(dir.path().join("storage.json")));
        let session = Session::initialize(CredentialStore::new(Arc::clone(&kv)));
        (kv, session)
    }

    #[test]
    fn starts_logged_out_with_empty_store() {
        let dir = TempDir::new().unwrap();
        let (_, session) = session_in(&dir);

        assert!(!session.is_authenticated());
        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn restores_persisted_credential() -> io::Result<()> {
        let dir = TempDir::new()?;
        {
            let (_, session) = session_in(&dir);
            session.set_authenticated(test_user("Ana"), "abc123")?;
        }

        let (_, session) = session_in(&dir);
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().map(|u| u.name), Some("Ana".to_string()));
        Ok(())
    }

    #[test]
    fn corrupt_user_record_starts_logged_out() -> io::Result<()> {
        let dir = TempDir::new()?;
        let kv = Arc::new(KvStore::open(dir.path().join("storage.json")));
        kv.set(TOKEN_KEY, "abc123")?;
        kv.set(USER_KEY, "{not json")?;

        let session = Session::initialize(CredentialStore::new(Arc::clone(&kv)));
        assert!(!session.is_authenticated());
        // Parse failure also cleared the stored credential
        assert_eq!(kv.get(TOKEN_KEY), None);
        Ok(())
    }

    #[test]
    fn subscribers_see_latest_value_immediately() -> io::Result<()> {
        let dir = TempDir::new()?;
        let (_, session) = session_in(&dir);

        session.set_authenticated(test_user("Ana"), "abc123")?;

        let rx = session.subscribe();
        let snapshot = rx.borrow();
        assert!(snapshot.is_authenticated);
        assert!(snapshot.current_user.is_some());
        Ok(())
    }

    #[test]
    fn snapshot_is_atomic() -> io::Result<()> {
        let dir = TempDir::new()?;
        let (_, session) = session_in(&dir);
        let rx = session.subscribe();

        session.set_authenticated(test_user("Ana"), "abc123")?;

        // Whatever state a subscriber reads, the two fields agree.
        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.is_authenticated, snapshot.current_user.is_some());
        Ok(())
    }

    #[test]
    fn clear_is_idempotent_and_clears_store() -> io::Result<()> {
        let dir = TempDir::new()?;
        let (kv, session) = session_in(&dir);

        session.set_authenticated(test_user("Ana"), "abc123")?;
        session.clear();
        session.clear();

        assert!(!session.is_authenticated());
        assert_eq!(session.current_user(), None);
        assert_eq!(kv.get(TOKEN_KEY), None);
        Ok(())
    }

    #[test]
    fn login_again_overwrites_credential() -> io::Result<()> {
        let dir = TempDir::new()?;
        let (kv, session) = session_in(&dir);

        session.set_authenticated(test_user("Ana"), "first")?;
        session.set_authenticated(test_user("Eva"), "second")?;

        assert_eq!(kv.get(TOKEN_KEY).as_deref(), Some("second"));
        assert_eq!(session.current_user().map(|u| u.name), Some("Eva".to_string()));
        Ok(())
    }

    #[test]
    fn refresh_user_keeps_token() -> io::Result<()> {
        let dir = TempDir::new()?;
        let (kv, session) = session_in(&dir);

        session.set_authenticated(test_user("Ana"), "abc123")?;
        session.refresh_user(test_user("Ana María"))?;

        assert_eq!(kv.get(TOKEN_KEY).as_deref(), Some("abc123"));
        assert_eq!(
            session.current_user().map(|u| u.name),
            Some("Ana María".to_string())
        );
        Ok(())
    }
}
