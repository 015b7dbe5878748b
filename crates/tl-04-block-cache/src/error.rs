//! Error types for the block cache

use ledger_types::{BlockError, IntegrityViolation};
use thiserror::Error;
use tl_01_coordination_store::StoreError;
use tl_03_block_builder::BuildError;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Integrity(#[from] IntegrityViolation),

    /// Verified transactions failed to seal
    #[error(transparent)]
    Seal(#[from] BlockError),

    /// Refresh tried to build a block without its predecessor in the cache
    #[error("block {block_num} has no cached parent")]
    MissingParent { block_num: u64 },

    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),
}

impl From<BuildError> for CacheError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Store(e) => Self::Store(e),
            BuildError::Integrity(e) => Self::Integrity(e),
            BuildError::Seal(e) => Self::Seal(e),
            BuildError::ParentMismatch { block_num, .. } => Self::MissingParent { block_num },
        }
    }
}
