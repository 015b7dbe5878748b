//! Error types for the ledger service

use ledger_types::IntegrityViolation;
use thiserror::Error;
use tl_01_coordination_store::StoreError;
use tl_02_sequencer::SequencerError;
use tl_04_block_cache::CacheError;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// `tx_number` does not address a slot inside a block
    #[error("txNumber {tx_number} is out of range for block size {block_size}")]
    TxNumberOutOfRange { tx_number: u64, block_size: u64 },

    #[error("invalid ledger configuration: {0}")]
    InvalidConfig(String),
}

impl LedgerError {
    /// The violation behind this error, if the ledger state is inconsistent.
    pub fn integrity(&self) -> Option<&IntegrityViolation> {
        match self {
            Self::Cache(CacheError::Integrity(v)) => Some(v),
            _ => None,
        }
    }

    pub fn is_integrity(&self) -> bool {
        self.integrity().is_some()
    }

    /// Caused by the request rather than by the ledger or the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::TxNumberOutOfRange { .. })
    }

    /// Check if error is transient (caller may retry)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sequencer(e) => e.is_retryable(),
            Self::Cache(CacheError::Store(e)) | Self::Store(e) => e.is_transient(),
            _ => false,
        }
    }
}
