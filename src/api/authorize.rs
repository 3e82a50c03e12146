//! Request/response middleware for the API transport.
//!
//! Middleware run in list order: `on_request` before the request leaves the
//! client, `on_error_status` after an error response and before the error
//! is returned to the caller. That ordering is what lets a 401 clear the
//! session before the original caller ever observes the failure.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, StatusCode};
use tracing::{debug, warn};

use crate::store::CredentialStore;

pub trait Middleware: Send + Sync {
    /// Inspect or amend the outbound request.
    fn on_request(&self, request: &mut Request);

    /// React to an error status. The error itself is still delivered to the
    /// caller afterwards.
    fn on_error_status(&self, _status: StatusCode) {}
}

/// Attaches `Authorization: Bearer <token>` to every request for which a
/// token is currently stored. The token is looked up per request, so a
/// login or logout between two requests takes effect immediately.
pub struct BearerAuth {
    credentials: CredentialStore,
}

impl BearerAuth {
    #[must_use]
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }
}

impl Middleware for BearerAuth {
    fn on_request(&self, request: &mut Request) {
        let Some(token) = self.credentials.token() else {
            debug!("no token stored, sending request unauthenticated");
            return;
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(err) => {
                warn!("stored token is not a valid header value: {err}");
            }
        }
    }
}

/// Forces a logout when the backend answers 401. A 403 means the credential
/// is valid but insufficient, so the session is left alone.
pub struct SessionExpiry {
    on_unauthorized: Box<dyn Fn() + Send + Sync>,
}

impl SessionExpiry {
    /// `on_unauthorized` is the single documented side effect of this
    /// middleware: it clears the session and records the redirect to the
    /// login route.
    #[must_use]
    pub fn new(on_unauthorized: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            on_unauthorized: Box::new(on_unauthorized),
        }
    }
}

impl Middleware for SessionExpiry {
    fn on_request(&self, _request: &mut Request) {}

    fn on_error_status(&self, status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED {
            debug!("401 received, forcing logout");
            (self.on_unauthorized)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KvStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn credentials_in(dir: &TempDir) -> (Arc<KvStore>, CredentialStore) {
        let kv = Arc::new(KvStore::open(dir.path().join("storage.json")));
        let credentials = CredentialStore::new(Arc::clone(&kv));
        (kv, credentials)
    }

    fn build_request() -> Request {
        Request::new(reqwest::Method::GET, "http://api.test/admin/user".parse().unwrap())
    }

    #[test]
    fn bearer_auth_attaches_stored_token() {
        let dir = TempDir::new().unwrap();
        let (kv, credentials) = credentials_in(&dir);
        kv.set("admin_token", "abc123").unwrap();

        let mut request = build_request();
        BearerAuth::new(credentials).on_request(&mut request);

        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer abc123"
        );
    }

    #[test]
    fn bearer_auth_skips_header_without_token() {
        let dir = TempDir::new().unwrap();
        let (_, credentials) = credentials_in(&dir);

        let mut request = build_request();
        BearerAuth::new(credentials).on_request(&mut request);

        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn bearer_auth_migrates_legacy_token() {
        let dir = TempDir::new().unwrap();
        let (kv, credentials) = credentials_in(&dir);
        kv.set("auth_token", "legacyXYZ").unwrap();

        let mut request = build_request();
        BearerAuth::new(credentials).on_request(&mut request);

        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer legacyXYZ"
        );
        assert_eq!(kv.get("admin_token").as_deref(), Some("legacyXYZ"));
        assert_eq!(kv.get("auth_token"), None);
    }

    #[test]
    fn session_expiry_fires_only_on_401() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let middleware = SessionExpiry::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        middleware.on_error_status(StatusCode::FORBIDDEN);
        middleware.on_error_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        middleware.on_error_status(StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
