//! # Opoadmin (Admin Console Client)
//!
//! `opoadmin` is the command-line admin console client for the opoadmin
//! exam-prep platform. It owns the client side of the session lifecycle:
//! credential persistence, observable session state, and the HTTP
//! authorization pipeline every request travels through.
//!
//! ## Session Model
//!
//! - **Credentials:** the bearer token and a cached copy of the admin user
//!   are persisted in a local key-value store. Values found under deprecated
//!   key names are migrated once to the canonical keys and the old keys are
//!   deleted.
//! - **Validation:** a locally stored token is never trusted for access on
//!   its own. Protected operations go through a guard that probes the
//!   backend; any probe failure is treated as session expiry and forces a
//!   logout.
//! - **Authorization pipeline:** outbound requests pass through an ordered
//!   middleware list that attaches `Authorization: Bearer <token>` before
//!   send. A `401` response clears the session and records a redirect to the
//!   login route before the error reaches the caller; a `403` is surfaced
//!   unchanged with no session mutation.
//!
//! ## Areas
//!
//! The platform is partitioned into operating areas (PN, PS). The selected
//! area is persisted alongside the credentials together with a bounded
//! history of past selections.

pub mod api;
pub mod app;
pub mod area;
pub mod auth;
pub mod cli;
pub mod guard;
pub mod models;
pub mod nav;
pub mod session;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
