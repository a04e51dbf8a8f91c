//! Error types for the focus API client.
//!
//! # Design
//! The raw-text operations only ever fail with `Transport`: whatever the
//! server answers, 4xx and 5xx included, is handed back as text. The
//! remaining variants belong to the typed `parse_*` methods, where
//! `Unauthorized` and `NotFound` get dedicated variants because callers
//! react to them differently (re-authenticate, drop the session id).

use thiserror::Error;

/// Errors returned by `FocusClient` and `FocusApi`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    /// Malformed base URLs land here too.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server returned 401.
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },

    /// The server returned 404; the focus session does not exist or
    /// belongs to someone else.
    #[error("resource not found")]
    NotFound,

    /// The server returned an unexpected status other than 401 and 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
