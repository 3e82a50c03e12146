//! Navigation sink for session side effects.
//!
//! The console has exactly one navigation side effect: sending the user to
//! the login route, optionally remembering the page they were trying to
//! reach. The `Navigator` composes and records that target; the binary
//! decides how to present it.

use std::sync::Mutex;

use tracing::debug;

pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Default)]
pub struct Navigator {
    last_redirect: Mutex<Option<String>>,
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a redirect to the login route. `return_url` is attached as a
    /// query parameter so a fresh login can resume where the user left off.
    /// Returns the composed target.
    pub fn to_login(&self, return_url: Option<&str>) -> String {
        let target = match return_url {
            Some(url) => format!("{LOGIN_ROUTE}?returnUrl={url}"),
            None => LOGIN_ROUTE.to_string(),
        };
        debug!("redirecting to {target}");
        *self
            .last_redirect
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(target.clone());
        target
    }

    /// Consume the pending redirect, if any.
    #[must_use]
    pub fn take_redirect(&self) -> Option<String> {
        self.last_redirect
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
    }

    #[must_use]
    pub fn pending_redirect(&self) -> Option<String> {
        self.last_redirect
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
