//! Gate for protected operations.
//!
//! The guard fast-rejects on the synchronous session flag, but never trusts
//! it alone to grant access: whenever the flag claims an authenticated
//! session, a live validation probe decides. A stale local token therefore
//! never reaches protected content: the probe fails, the validation side
//! effect clears the credential, and the guard denies with a redirect that
//! carries the originally requested path.

use std::sync::Arc;

use tracing::debug;

use crate::auth::AuthClient;
use crate::nav::Navigator;
use crate::session::Session;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Deny { redirect: String },
}

impl GuardOutcome {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

pub struct RouteGuard {
    session: Session,
    auth: AuthClient,
    navigator: Arc<Navigator>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: Session, auth: AuthClient, navigator: Arc<Navigator>) -> Self {
        Self {
            session,
            auth,
            navigator,
        }
    }

    /// Decide whether navigation to `requested_path` may proceed. Invoked
    /// once per navigation attempt; the attempt is suspended until the
    /// validation probe resolves.
    pub async fn check(&self, requested_path: &str) -> GuardOutcome {
        if !self.session.is_authenticated() {
            debug!("denying {requested_path}: not authenticated");
            let redirect = self.navigator.to_login(Some(requested_path));
            return GuardOutcome::Deny { redirect };
        }

        if self.auth.validate_token().await {
            GuardOutcome::Allow
        } else {
            debug!("denying {requested_path}: token validation failed");
            let redirect = self.navigator.to_login(Some(requested_path));
            GuardOutcome::Deny { redirect }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BearerAuth, Middleware, SessionExpiry, Transport};
    use crate::models::User;
    use crate::store::credentials::{LEGACY_TOKEN_KEYS, TOKEN_KEY};
    use crate::store::{CredentialStore, KvStore};
    use serde_json::json;
    use std::net::TcpListener;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    struct TestGuard {
        kv: Arc<KvStore>,
        session: Session,
        guard: RouteGuard,
        _dir: TempDir,
    }

    fn guard_against(server_url: &str) -> TestGuard {
        let dir = TempDir::new().unwrap();
        let kv = Arc::new(KvStore::open(dir.path().join("storage.json")));
        let credentials = CredentialStore::new(Arc::clone(&kv));
        let session = Session::initialize(credentials.clone());
        let navigator = Arc::new(Navigator::new());

        let expiry_session = session.clone();
        let expiry_navigator = Arc::clone(&navigator);
        let middlewares: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(BearerAuth::new(credentials.clone())),
            Arc::new(SessionExpiry::new(move || {
                expiry_session.clear();
                expiry_navigator.to_login(None);
            })),
        ];

        let transport =
            Arc::new(Transport::new(server_url, Duration::from_secs(5), middlewares).unwrap());
        let auth = AuthClient::new(
            transport,
            session.clone(),
            credentials,
            Arc::clone(&navigator),
        );
        let guard = RouteGuard::new(session.clone(), auth, navigator);

        TestGuard {
            kv,
            session,
            guard,
            _dir: dir,
        }
    }

    fn ana() -> User {
        serde_json::from_value(json!({
            "id": "u1",
            "name": "Ana",
            "email": "ana@example.com"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn no_session_denies_with_return_url() {
        let ctx = guard_against("http://127.0.0.1:9/api");

        let outcome = ctx.guard.check("/topics").await;
        assert_eq!(
            outcome,
            GuardOutcome::Deny {
                redirect: "/login?returnUrl=/topics".to_string()
            }
        );
    }

    #[tokio::test]
    async fn valid_session_is_allowed() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/admin/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Ana",
                "email": "ana@example.com"
            })))
            .mount(&server)
            .await;

        let ctx = guard_against(&server.uri());
        ctx.session.set_authenticated(ana(), "abc123").unwrap();

        assert!(ctx.guard.check("/topics").await.is_allowed());
    }

    #[tokio::test]
    async fn expired_token_denies_and_clears_credential() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/admin/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let ctx = guard_against(&server.uri());
        ctx.session.set_authenticated(ana(), "expired1").unwrap();

        let outcome = ctx.guard.check("/topics").await;
        assert_eq!(
            outcome,
            GuardOutcome::Deny {
                redirect: "/login?returnUrl=/topics".to_string()
            }
        );

        // "expired1" is gone under every key
        assert_eq!(ctx.kv.get(TOKEN_KEY), None);
        for key in LEGACY_TOKEN_KEYS {
            assert_eq!(ctx.kv.get(key), None);
        }
        assert!(!ctx.session.is_authenticated());
    }

    #[tokio::test]
    async fn probe_network_error_denies() {
        // Connection refused: validation errors out, which counts as an
        // invalid session.
        let ctx = guard_against("http://127.0.0.1:9/api");
        ctx.session.set_authenticated(ana(), "abc123").unwrap();

        let outcome = ctx.guard.check("/users").await;
        assert_eq!(
            outcome,
            GuardOutcome::Deny {
                redirect: "/login?returnUrl=/users".to_string()
            }
        );
        assert!(!ctx.session.is_authenticated());
    }
}
