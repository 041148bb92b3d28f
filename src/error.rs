//! Error types for immich-helper
//!
//! This module provides error handling for the library, including:
//! - The crate-wide [`Error`] type and [`Result`] alias
//! - The error payload the Immich server returns on failed requests
//! - A coarse classification of failures that decides how a wizard recovers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for immich-helper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for immich-helper
///
/// Each variant carries enough context to be shown to the operator as-is.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "retime.filename_pattern")
        key: Option<String>,
    },

    /// The instance URL could not be parsed or joined with an endpoint path
    #[error("invalid instance URL {url}: {reason}")]
    InvalidInstance {
        /// The URL as entered by the operator
        url: String,
        /// Why the URL was rejected
        reason: String,
    },

    /// The server answered with a status code other than the one the operation expects
    #[error("{endpoint} returned HTTP {status}: {}", .detail.message)]
    Api {
        /// Endpoint path relative to the instance base URL
        endpoint: String,
        /// HTTP status code received
        status: u16,
        /// Error payload sent by the server (synthesized when the body is not JSON)
        detail: ServerError,
    },

    /// The server answered with a body of an unexpected shape
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Endpoint path relative to the instance base URL
        endpoint: String,
        /// What was wrong with the body
        reason: String,
        /// The raw body, for display to the operator
        body: String,
    },

    /// Resolving the assets of a tag failed while building a rollback record
    #[error("could not resolve assets of tag {tag}: {source}")]
    Snapshot {
        /// Name of the tag being resolved
        tag: String,
        /// What went wrong
        #[source]
        source: Box<Error>,
    },

    /// Album lookup did not yield an album
    #[error("album {0} not found")]
    AlbumNotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Console input ended before the operator answered a prompt
    #[error("console input closed")]
    InputClosed,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// How a failure should be handled by the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The endpoint is unreachable or is not an API endpoint; re-enter credentials
    Endpoint,
    /// The endpoint works but refuses the key; re-enter the key
    Authentication,
    /// A single request was refused; record it and continue
    Request,
    /// The server sent something unexpected; report and give up on the operation
    Malformed,
    /// Local problem (files, configuration, console)
    Local,
}

impl Error {
    /// Classify this error for recovery decisions
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::InvalidInstance { .. } => FailureKind::Endpoint,
            Error::Network(e) if e.is_connect() || e.is_timeout() || e.is_builder() => {
                FailureKind::Endpoint
            }
            Error::Network(_) => FailureKind::Request,
            Error::Api { status: 401, .. } => FailureKind::Authentication,
            Error::Api { .. } | Error::AlbumNotFound(_) => FailureKind::Request,
            Error::Snapshot { source, .. } => source.kind(),
            Error::MalformedResponse { .. } | Error::Serialization(_) => FailureKind::Malformed,
            Error::Config { .. }
            | Error::Io(_)
            | Error::InputClosed
            | Error::Other(_) => FailureKind::Local,
        }
    }

    /// Message suitable for listing next to a failed batch item
    ///
    /// For server refusals this is `"<status> - <server message>"`, otherwise the
    /// error's display text.
    pub fn item_message(&self) -> String {
        match self {
            Error::Api { status, detail, .. } => format!("{} - {}", status, detail.message),
            other => other.to_string(),
        }
    }
}

/// Error payload returned by the Immich API
///
/// # Example JSON Response
///
/// ```json
/// {
///   "message": "Tag not found",
///   "error": "Bad Request",
///   "statusCode": 400,
///   "correlationId": "x1y2z3"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerError {
    /// Human-readable error message
    #[serde(deserialize_with = "message_or_list")]
    pub message: String,

    /// HTTP reason phrase chosen by the server
    #[serde(default)]
    pub error: Option<String>,

    /// Status code echoed by the server
    #[serde(default)]
    pub status_code: Option<u16>,

    /// Request correlation id, useful when reading server logs
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl ServerError {
    /// Build a payload from a raw response body
    ///
    /// Falls back to using the trimmed body text as message when it is not the
    /// JSON error shape.
    pub fn from_body(status: u16, body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| Self {
            message: if body.trim().is_empty() {
                "no response body".to_string()
            } else {
                body.trim().to_string()
            },
            error: None,
            status_code: Some(status),
            correlation_id: None,
        })
    }
}

// Validation errors arrive as a list of messages.
fn message_or_list<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Message {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Message::deserialize(deserializer)? {
        Message::One(message) => message,
        Message::Many(messages) => messages.join("; "),
    })
}
