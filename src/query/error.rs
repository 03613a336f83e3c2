//! Query service error types

use thiserror::Error;

/// Query error with classification
///
/// Every kind reaches the user as the same generic failure; the kind and
/// message only go to the logs.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::Network, message)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::new(QueryErrorKind::Status(status), format!("HTTP {status}: {body}"))
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::Malformed, message)
    }
}

/// Error classification for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Connection refused, DNS, reset
    Network,
    /// Non-2xx response
    Status(u16),
    /// Body was not the expected JSON
    Malformed,
}

impl QueryErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Status(_) => "status",
            Self::Malformed => "malformed",
        }
    }
}
