use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the API transport. Session side effects (forced
/// logout on 401) have already happened by the time one of these reaches a
/// caller; callers only decide how to present it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{url} - {status}, {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to persist credentials: {0}")]
    Storage(#[from] std::io::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }
}
