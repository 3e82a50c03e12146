//! Authentication client.
//!
//! Owns the login/logout/validate flows against the backend and keeps
//! [`Session`] and the credential store in step with their results. Errors
//! are propagated untouched, with no retries at this layer; the caller decides
//! how to present a failed login, while the session consequences of an
//! expired token (forced logout, redirect) have already happened by the
//! time the error arrives.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::api::{ApiError, Transport};
use crate::area::AreaCode;
use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, User, UserStats,
    UserUpdate,
};
use crate::nav::Navigator;
use crate::session::Session;
use crate::store::CredentialStore;

pub const LOGIN_PATH: &str = "/auth/login";
pub const USER_PATH: &str = "/admin/user";
pub const RESET_PASSWORD_PATH: &str = "/admin/user/reset-password";
pub const USER_STATS_PATH: &str = "/admin/stats/user";

#[derive(Clone)]
pub struct AuthClient {
    transport: Arc<Transport>,
    session: Session,
    credentials: CredentialStore,
    navigator: Arc<Navigator>,
}

impl AuthClient {
    #[must_use]
    pub fn new(
        transport: Arc<Transport>,
        session: Session,
        credentials: CredentialStore,
        navigator: Arc<Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            credentials,
            navigator,
        }
    }

    /// Exchange credentials for a session. On success the credential is
    /// persisted and the session flips to authenticated in one step; on
    /// failure nothing changes and the error goes back to the caller as-is.
    ///
    /// # Errors
    /// Returns the backend error untouched; no retry.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let response: LoginResponse = self.transport.post_json(LOGIN_PATH, &request).await?;

        self.session
            .set_authenticated(response.user.clone(), &response.token)?;
        debug!("logged in as {}", response.user.email);

        Ok(response)
    }

    /// Clear the session and credential store, then record the redirect to
    /// the login route. Never fails; safe to call when already logged out.
    pub fn logout(&self) {
        self.session.clear();
        self.navigator.to_login(None);
    }

    /// Probe the backend to confirm the stored token is still accepted.
    /// With no token this is `false` without a network call. Any probe
    /// failure (401, network, undecodable body) is treated as session
    /// expiry: the credential is cleared and `false` is returned. Never
    /// retried.
    pub async fn validate_token(&self) -> bool {
        if self.credentials.token().is_none() {
            return false;
        }

        match self.transport.get_json::<User>(USER_PATH).await {
            Ok(_) => true,
            Err(err) => {
                debug!("token validation failed: {err}");
                self.logout();
                false
            }
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.credentials.token()
    }

    /// Synchronous snapshot of the session flag; not a server check.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    /// # Errors
    /// Returns the backend error untouched.
    pub async fn user_info(&self) -> Result<User, ApiError> {
        self.transport.get_json(USER_PATH).await
    }

    /// Apply a partial profile update. On success the cached user is
    /// refreshed in the store and the session; the token is not touched.
    ///
    /// # Errors
    /// Returns the backend error untouched.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let user: User = self.transport.put_json(USER_PATH, update).await?;
        self.session.refresh_user(user.clone())?;
        Ok(user)
    }

    /// # Errors
    /// Returns the backend error untouched.
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<MessageResponse, ApiError> {
        let request = ChangePasswordRequest {
            current_password: current.expose_secret(),
            new_password: new.expose_secret(),
        };
        self.transport.post_json(RESET_PASSWORD_PATH, &request).await
    }

    /// # Errors
    /// Returns the backend error untouched.
    pub async fn user_stats(&self) -> Result<UserStats, ApiError> {
        self.transport.get_json(USER_STATS_PATH).await
    }

    /// Area the current user belongs to, derived from their app id.
    #[must_use]
    pub fn user_area(&self) -> AreaCode {
        match self.session.current_user().and_then(|user| user.app_id) {
            Some(ref app_id) if app_id == "1" => AreaCode::Pn,
            _ => AreaCode::Ps,
        }
    }
}
