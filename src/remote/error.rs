//! Error types for the memory client.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Errors that can occur when talking to the memory API.
#[derive(Error, Debug)]
pub enum MemoryError {
    /// The request was rejected locally, before any network I/O
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The client could not be constructed from the supplied configuration
    #[error("Invalid client configuration: {0}")]
    Config(String),

    /// Connection or protocol failure in the HTTP transport
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller cancelled the call while it was in flight
    #[error("Request cancelled")]
    Cancelled,

    /// The call did not finish within the context timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The API answered with a structured error body
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The API answered with a non-success status and an unrecognised body
    #[error("API error ({status}): {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A success body matched none of the accepted response shapes
    #[error("Failed to decode response: {reason}\nBody: {body}")]
    Decode { reason: String, body: String },

    /// The request payload could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// The external python process exited unsuccessfully
    #[error("Python bridge failed ({status})\nOutput: {output}")]
    Bridge { status: String, output: String },

    /// Local I/O failure (temp files, process spawn)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MemoryError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True when the error was raised locally without touching the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// One entry of a token-level error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub token_class: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub message: String,
}

/// Structured error body returned by the memory API.
///
/// The service answers either with a `{detail, code}` pair or with a list of
/// token errors under `messages`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status of the response that carried this body
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub messages: Vec<ErrorMessage>,
}

impl ApiError {
    /// Whether the body carried either of the recognised error forms.
    pub fn is_structured(&self) -> bool {
        self.detail.as_deref().is_some_and(|d| !d.is_empty()) || !self.messages.is_empty()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mem0 API error ({}): ", self.status)?;

        if let Some(detail) = self.detail.as_deref().filter(|d| !d.is_empty()) {
            return write!(
                f,
                "{} (code: {})",
                detail,
                self.code.as_deref().unwrap_or("-")
            );
        }

        match self.messages.first() {
            Some(first) => write!(
                f,
                "{} (token type: {}, token class: {})",
                first.message, first.token_type, first.token_class
            ),
            None => write!(f, "unknown error"),
        }
    }
}

impl std::error::Error for ApiError {}
