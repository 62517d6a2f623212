//! Error types for the Razorpay client core.
//!
//! # Design
//! Every call resolves to exactly one of a success value or an `Error`.
//! `Api` is reserved for non-200 responses whose body parsed as the
//! upstream `{"error": {...}}` envelope; anything the client could not make
//! sense of lands in `MalformedResponse` with the raw body for debugging.
//! Transport failures are wrapped without reinterpretation so callers can
//! downcast to the transport's own error type.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::types::null_as_default;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the client, backend and signature helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// DNS, connection, TLS or timeout failure below the protocol layer.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The params object could not be serialized to a query string or body.
    #[error("failed to encode request params: {0}")]
    Encoding(String),

    /// The API answered with a structured error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response body did not match the expected error or success shape.
    #[error("malformed response (HTTP {status}): {source}")]
    MalformedResponse {
        status: u16,
        body: Vec<u8>,
        #[source]
        source: serde_json::Error,
    },

    /// A required signature field was absent from the verification input.
    #[error("{0} is missing in params")]
    MissingSignature(&'static str),

    /// Credentials or other settings are missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any transport-level failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Transport(err.into())
    }

    /// Returns the structured API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }
}

/// Structured error returned by the API on any non-200 status.
///
/// `field`, `source`, `step` and `reason` are sent as `null` for most error
/// codes, hence the options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: HashMap<String, String>,
    /// HTTP status the error arrived with.
    #[serde(skip)]
    pub status: u16,
    /// Raw response body.
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code: {}, description: {}", self.code, self.description)
    }
}

// Implemented by hand: the wire field `source` is a string, not a cause.
impl std::error::Error for ApiError {}
