//! Error types for block construction

use ledger_types::{BlockError, IntegrityViolation};
use thiserror::Error;
use tl_01_coordination_store::StoreError;

/// Result type alias for build operations
pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Integrity(#[from] IntegrityViolation),

    /// Verified transactions still failed to seal
    #[error(transparent)]
    Seal(#[from] BlockError),

    /// The parent handed in is not block `block_num - 1`
    #[error("block {block_num} cannot be built on parent {parent:?}")]
    ParentMismatch {
        block_num: u64,
        parent: Option<u64>,
    },
}
