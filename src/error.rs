//! Error taxonomy for the network and session layers.
//!
//! ERROR HANDLING
//! ==============
//! `ApiError` carries stringified causes so it stays `Clone`: one refresh
//! outcome may be handed to several waiters when refresh coalescing is on.
//! `AuthError` is what session operations surface to callers (login forms,
//! the CLI); session transitions themselves never leak errors.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced while building, sending, or decoding a backend request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, TLS, timeout, bad URL).
    #[error("request failed: {0}")]
    Transport(String),

    /// A payload could not be serialized to JSON.
    #[error("payload serialization failed: {0}")]
    Serialize(String),

    /// A response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A caller-supplied header name or value was rejected.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Whether retrying the same request could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::Transport(format!("invalid request: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The auth context was used before its provider mounted.
    #[error("auth context used outside a mounted AuthProvider")]
    NotMounted,

    /// The backend refused the credentials; the message is shown verbatim.
    #[error("{0}")]
    LoginRejected(String),

    /// Login returned success but no admin record.
    #[error("login response did not include an admin")]
    MalformedLogin,

    #[error(transparent)]
    Api(#[from] ApiError),
}
