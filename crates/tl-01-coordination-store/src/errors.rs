//! Error types for coordination store operations

use std::time::Duration;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures reported by a coordination store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The operation did not complete within its deadline. The write may or
    /// may not have been applied.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The store could not be reached (connection loss, leader election).
    #[error("coordination store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the request.
    #[error("coordination store error: {0}")]
    Backend(String),

    /// A key under the ledger prefix does not decode to an index.
    #[error(transparent)]
    MalformedKey(#[from] KeyError),
}

impl StoreError {
    /// Check if error is transient (caller may retry)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }

    /// Whether a write that failed this way may still have been applied.
    pub fn is_ambiguous_write(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A key that is not a valid index key for a [`crate::KeySpace`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed index key {key:?}: {reason}")]
pub struct KeyError {
    pub key: String,
    pub reason: &'static str,
}
