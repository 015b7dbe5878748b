//! Error types for the sequencer

use thiserror::Error;
use tl_01_coordination_store::StoreError;

/// Result type alias for sequencing operations
pub type Result<T> = std::result::Result<T, SequencerError>;

#[derive(Debug, Clone, Error)]
pub enum SequencerError {
    /// Every attempt lost its race against another writer
    #[error("index allocation still contended after {attempts} attempts")]
    Contention { attempts: u32 },

    /// The coordination store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The committed tip is already `u64::MAX`
    #[error("global index space exhausted")]
    IndexSpaceExhausted,

    #[error("failed to encode transaction: {0}")]
    Encoding(String),

    #[error("invalid sequencer configuration: {0}")]
    InvalidConfig(String),
}

impl SequencerError {
    /// Whether the caller may reasonably try the proposal again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Contention { .. } => true,
            Self::Store(e) => e.is_transient(),
            _ => false,
        }
    }
}
