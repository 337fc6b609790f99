#![forbid(unsafe_code)]

//! Error types and the error records the store keeps for the UI.
//!
//! Fetch failures never leave the store as errors. They are folded into
//! records: one session-level message for the tree, one per-id record for
//! leaves.

use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Fetch errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised by a [`TreeSource`](crate::source::TreeSource) or
/// [`Transport`](crate::source::Transport).
#[derive(Debug)]
pub enum FetchError {
    /// Non-success response. `message` is already human readable.
    Status { status: u16, message: String },
    /// I/O error while reading a local payload.
    Io(std::io::Error),
    /// Payload could not be decoded.
    Decode(String),
    /// The source cannot serve the request at all.
    Unavailable(String),
}

impl FetchError {
    /// Build a status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// The HTTP-style status, when there is one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status { message, .. } => f.write_str(message),
            FetchError::Io(e) => write!(f, "I/O error: {e}"),
            FetchError::Decode(msg) => write!(f, "decode error: {msg}"),
            FetchError::Unavailable(msg) => write!(f, "source unavailable: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Io(e) => Some(e),
            FetchError::Status { .. } | FetchError::Decode(_) | FetchError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

// ─────────────────────────────────────────────────────────────────────────────
// Config errors
// ─────────────────────────────────────────────────────────────────────────────

/// An environment variable held a value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { var: &'static str, value: String },
    Empty { var: &'static str },
    /// The URL names a scheme the chosen transport does not serve.
    UnsupportedUrl { var: &'static str, url: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { var, value } => {
                write!(f, "invalid value for {var}: {value:?}")
            }
            ConfigError::Empty { var } => write!(f, "{var} is set but empty"),
            ConfigError::UnsupportedUrl { var, url } => {
                write!(f, "{var}: transport cannot serve {url}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ─────────────────────────────────────────────────────────────────────────────
// Error records
// ─────────────────────────────────────────────────────────────────────────────

/// Per-leaf fetch failure shown inline on that node.
///
/// `seq` distinguishes consecutive failures for the same id so that a timed
/// clear scheduled for an older failure does not wipe a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafError {
    pub id: String,
    pub message: String,
    pub seq: u64,
}
