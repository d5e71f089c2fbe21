//! Error types for the planner data store.

use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur when reading or writing planner records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured store URL is invalid.
    #[error("invalid store URL: {0}")]
    InvalidUrl(String),

    /// HTTP layer failed (connection, timeout, etc.).
    #[error("store HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// JSON encoding or decoding failed.
    #[error("failed to parse store payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A record referenced by ID does not exist.
    #[error("{table} record not found: {id}")]
    NotFound {
        /// Table the lookup ran against.
        table: &'static str,
        /// Missing record ID.
        id: Uuid,
    },

    /// A record failed validation before being written.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The store answered with a payload of the wrong shape.
    #[error("unexpected store response: {0}")]
    UnexpectedResponse(String),

    /// The store is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if this error is retryable (transient transport or
    /// server-side failures).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Unavailable(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = StoreError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_retryable());
        assert!(StoreError::Unavailable("offline".into()).is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = StoreError::Status {
            status: 404,
            body: "{}".into(),
        };
        assert!(!err.is_retryable());
        assert!(!StoreError::InvalidUrl("x".into()).is_retryable());
        assert!(!StoreError::InvalidRecord("day".into()).is_retryable());
    }

    #[test]
    fn display_names_table_and_id() {
        let id = Uuid::nil();
        let err = StoreError::NotFound { table: "tasks", id };
        assert_eq!(err.to_string(), format!("tasks record not found: {id}"));
    }
}
