//! Error types for the feedsme API client.
//!
//! # Design
//! Configuration problems (`MissingUrl`, `InvalidUrl`, `UnsupportedMethod`)
//! surface synchronously from constructors and parsers. Everything that can
//! go wrong after a call starts (`Serialization`, `Transport`,
//! `UnparsableResponse`, `Status`) is delivered as the single result of that
//! call. `Status` displays as the bare server message so callers can show it
//! unchanged.

use thiserror::Error;

/// Errors returned by `FeedsmeClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No base URL could be resolved from the client configuration.
    #[error("Feedsme URL required")]
    MissingUrl,

    /// The resolved base URL is not an absolute URL usable as a base.
    #[error("invalid feedsme URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A method string did not name a supported HTTP method.
    #[error("unsupported HTTP method {0:?}")]
    UnsupportedMethod(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Connection, I/O or body-read failure in the HTTP transport.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The response body was empty, not JSON, or a falsy JSON value.
    #[error("Unparsable response with statusCode {status}")]
    UnparsableResponse { status: u16 },

    /// The server answered with a status other than 200.
    #[error("{message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    /// HTTP status observed for response-level errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnparsableResponse { status } | ApiError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
