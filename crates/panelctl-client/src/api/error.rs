//! Gateway error taxonomy.

use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by the remote resource gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session token, or the remote rejected the token.
    #[error("Unauthorized: session missing or rejected")]
    Unauthorized,

    /// The remote denied the operation for this caller.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The targeted resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote rejected the specific operation (duplicate name, bad
    /// argument, limit reached).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Network failure or a server-side error.
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// The response body violated the expected contract.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::MalformedResponse(e.to_string())
        } else {
            Self::RemoteUnavailable(e.to_string())
        }
    }
}

impl ApiError {
    /// Map a non-success HTTP status (plus the remote's detail string) to a
    /// taxonomy variant. 400 is grouped with 409: the remote uses it for
    /// operation-specific rejections like duplicate usernames.
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            400 | 409 => Self::Conflict(detail),
            _ => Self::RemoteUnavailable(format!("HTTP {status}: {detail}")),
        }
    }
}

/// FastAPI-style error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
