//! # Error Types
//!
//! Integrity violations are shared across the builder, the cache and the
//! service so that every layer reports the same failure modes.

use thiserror::Error;

/// A fatal inconsistency between the store contents and the ledger's
/// invariants.
///
/// Never mapped to "not found": serving the affected block range stops until
/// an operator intervenes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityViolation {
    /// A stored value could not be decoded as a transaction.
    #[error("malformed transaction at index {index}: {reason}")]
    MalformedTransaction { index: u64, reason: String },

    /// A stored transaction claims a position other than its key.
    #[error(
        "transaction at index {index} claims block {claimed_block} tx {claimed_tx}, expected block {expected_block} tx {expected_tx}"
    )]
    PositionMismatch {
        index: u64,
        expected_block: u64,
        expected_tx: u64,
        claimed_block: u64,
        claimed_tx: u64,
    },

    /// A block the store reports as sealed is missing transactions.
    #[error("block {block_num} is sealed per the committed tip but only {present} of {expected} transactions exist")]
    Gap {
        block_num: u64,
        present: u64,
        expected: u64,
    },

    /// `previous_hash` does not match the hash of the preceding block.
    #[error("block {block_num} links to {found:?}, but block {} hashes to {expected:?}", .block_num.saturating_sub(1))]
    ChainMismatch {
        block_num: u64,
        expected: String,
        found: String,
    },

    /// The stored hash does not match the recomputed canonical hash.
    #[error("block {block_num} carries hash {stored}, recomputed {computed}")]
    HashMismatch {
        block_num: u64,
        stored: String,
        computed: String,
    },

    /// A rebuilt block differs from the copy already cached.
    #[error("block {block_num} rebuilt from the store differs from the cached copy (cached {cached_hash}, rebuilt {rebuilt_hash})")]
    Diverged {
        block_num: u64,
        cached_hash: String,
        rebuilt_hash: String,
    },

    /// A committed key does not decode to an index in this ledger's namespace.
    #[error("malformed key in ledger namespace: {key}")]
    MalformedKey { key: String },
}

impl IntegrityViolation {
    /// Block number the violation was detected for, when one applies.
    pub fn block_num(&self) -> Option<u64> {
        match self {
            Self::Gap { block_num, .. }
            | Self::ChainMismatch { block_num, .. }
            | Self::HashMismatch { block_num, .. }
            | Self::Diverged { block_num, .. } => Some(*block_num),
            Self::MalformedTransaction { .. }
            | Self::PositionMismatch { .. }
            | Self::MalformedKey { .. } => None,
        }
    }
}
