//! Process-root wiring.
//!
//! One [`App`] owns the session state, credential store, transport and
//! guard, built once at startup and passed by handle to whoever needs
//! them. Nothing in the crate reaches for ambient/static session state, so
//! tests can construct as many isolated instances as they like.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::{BearerAuth, Middleware, SessionExpiry, Transport};
use crate::area::{AreaCode, AreaContext};
use crate::auth::AuthClient;
use crate::guard::RouteGuard;
use crate::nav::Navigator;
use crate::session::Session;
use crate::store::{CredentialStore, KvStore};

pub const STORAGE_FILE: &str = "storage.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub timeout: Duration,
}

pub struct App {
    pub session: Session,
    pub auth: AuthClient,
    pub guard: RouteGuard,
    pub areas: AreaContext,
    pub navigator: Arc<Navigator>,
}

impl App {
    /// Wire up the full session core: storage, session state, authorization
    /// middleware, auth client, guard and area context.
    ///
    /// # Errors
    /// Returns an error if the API URL is invalid or the HTTP client cannot
    /// be built.
    pub fn bootstrap(config: &AppConfig) -> Result<Self> {
        let kv = Arc::new(KvStore::open(config.data_dir.join(STORAGE_FILE)));
        let credentials = CredentialStore::new(Arc::clone(&kv));
        let session = Session::initialize(credentials.clone());
        let navigator = Arc::new(Navigator::new());

        // The one documented side effect of the authorization pipeline: a
        // 401 clears the session and records the redirect before the error
        // reaches the caller.
        let expiry_session = session.clone();
        let expiry_navigator = Arc::clone(&navigator);
        let middlewares: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(BearerAuth::new(credentials.clone())),
            Arc::new(SessionExpiry::new(move || {
                expiry_session.clear();
                expiry_navigator.to_login(None);
            })),
        ];

        let transport = Arc::new(
            Transport::new(&config.api_url, config.timeout, middlewares)
                .context("failed to build API transport")?,
        );

        let auth = AuthClient::new(
            Arc::clone(&transport),
            session.clone(),
            credentials,
            Arc::clone(&navigator),
        );
        let guard = RouteGuard::new(session.clone(), auth.clone(), Arc::clone(&navigator));
        let areas = AreaContext::initialize(kv);

        Ok(Self {
            session,
            auth,
            guard,
            areas,
            navigator,
        })
    }

    /// Area to display: the explicit selection wins over the one derived
    /// from the user's app id.
    #[must_use]
    pub fn display_area(&self) -> AreaCode {
        self.areas
            .current_id()
            .and_then(|id| AreaCode::from_id(&id))
            .unwrap_or_else(|| self.auth.user_area())
    }
}

/// Default data directory: `<platform config dir>/opoadmin`.
///
/// # Errors
/// Returns an error if the platform config directory cannot be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")))
        .context("cannot find config directory")
}
