//! Shared types for the crate.
//!
//! Holds the closed error enumeration returned by every core operation and
//! the small value types used by both the REST layer and the booking binder.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::openapi::models::ErrorBody;

/// Result alias used throughout the core.
pub type Result<T, E = SaxoError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// ISO currency code as it appears in broker exports and responses.
///
/// Treated as opaque text; the only rule is that it is non-empty. The
/// `Default` value is the empty, unset code used for scratch records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Wrap a currency code, rejecting the empty string.
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        if code.is_empty() {
            None
        } else {
            Some(Self(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_set(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Every failure the core can report.
///
/// Callers match on the variant; nothing here is retried or swallowed.
#[derive(Debug, thiserror::Error)]
pub enum SaxoError {
    #[error("Unknown endpoint: {0}")]
    NotFound(String),

    #[error("Serialization failed: {0}")]
    SerializationFailure(String),

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Upstream rejected request ({status_line}): {body}")]
    UpstreamRejected {
        status: u16,
        status_line: String,
        body: String,
    },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("No value for path placeholder {{{0}}}")]
    MissingParameter(String),

    #[error("No {0} set")]
    MissingKey(&'static str),

    #[error("Mismatch in expected field length, expected {expected} got {got}")]
    FieldCountMismatch { expected: usize, got: usize },

    #[error("Malformed number in column {position} ({field}): {token:?}")]
    MalformedNumber {
        position: usize,
        field: String,
        token: String,
    },

    #[error("Malformed date in column {position} ({field}): {token:?}")]
    MalformedDate {
        position: usize,
        field: String,
        token: String,
    },

    #[error("Could not interpret {token:?} as a bool in column {position} ({field})")]
    UnrecognizedBoolean {
        position: usize,
        field: String,
        token: String,
    },

    #[error("Empty currency code in column {position} ({field})")]
    EmptyCurrency { position: usize, field: String },

    #[error("Unsupported field type: {0}")]
    UnsupportedFieldType(String),

    #[error("Failed to read tabular source: {0}")]
    SourceFailure(String),
}

impl SaxoError {
    /// HTTP status of an upstream rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SaxoError::UpstreamRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decode the broker's error document carried by an upstream rejection.
    ///
    /// Returns `None` for other variants or when the body is not the
    /// broker's JSON error shape.
    pub fn error_body(&self) -> Option<ErrorBody> {
        match self {
            SaxoError::UpstreamRejected { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    /// Column position of a field-level coercion failure.
    pub fn position(&self) -> Option<usize> {
        match self {
            SaxoError::MalformedNumber { position, .. }
            | SaxoError::MalformedDate { position, .. }
            | SaxoError::UnrecognizedBoolean { position, .. }
            | SaxoError::EmptyCurrency { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SaxoError {
    fn from(e: serde_json::Error) -> Self {
        SaxoError::SerializationFailure(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
