//! # Core Ledger Entities
//!
//! - `ProposedTransaction`: client input, no identity yet
//! - `Transaction`: a proposal that won a global index
//! - `TxPosition`: the (blockNum, txNumber) decomposition of a global index
//! - `BlockSize`: the non-zero block length all replicas agree on

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// A transaction as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedTransaction {
    /// Opaque payload. Never validated beyond being stored.
    pub content: String,
}

impl ProposedTransaction {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A committed transaction.
///
/// Identity is `(block_num, tx_number)`, which is the global index decomposed
/// by the ledger's block size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Payload copied from the proposal.
    pub content: String,
    /// RFC 3339 wall clock at which the sequencer serialized this value.
    #[serde(default)]
    pub timestamp: String,
    /// Block this transaction belongs to.
    pub block_num: u64,
    /// Position inside the block, in `[0, block_size)`.
    pub tx_number: u64,
}

impl Transaction {
    pub fn new(proposed: ProposedTransaction, position: TxPosition, timestamp: String) -> Self {
        Self {
            content: proposed.content,
            timestamp,
            block_num: position.block_num,
            tx_number: position.tx_number,
        }
    }

    pub fn position(&self) -> TxPosition {
        TxPosition {
            block_num: self.block_num,
            tx_number: self.tx_number,
        }
    }
}

/// Location of a transaction in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPosition {
    pub block_num: u64,
    pub tx_number: u64,
}

/// Number of transactions in every sealed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize(NonZeroU64);

impl BlockSize {
    /// Returns `None` for zero.
    pub fn new(size: u64) -> Option<Self> {
        NonZeroU64::new(size).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Decompose a global index into `(block_num, tx_number)`.
    pub fn position(self, index: u64) -> TxPosition {
        TxPosition {
            block_num: index / self.get(),
            tx_number: index % self.get(),
        }
    }

    /// Recompose a position into its global index.
    ///
    /// Returns `None` if `tx_number` is out of range or the index overflows.
    pub fn index_of(self, position: TxPosition) -> Option<u64> {
        if position.tx_number >= self.get() {
            return None;
        }
        position
            .block_num
            .checked_mul(self.get())?
            .checked_add(position.tx_number)
    }

    /// First global index of `block_num`.
    pub fn first_index(self, block_num: u64) -> Option<u64> {
        block_num.checked_mul(self.get())
    }

    /// Number of fully sealed blocks given the highest committed index.
    pub fn sealed_blocks(self, highest_index: Option<u64>) -> u64 {
        let size = self.get();
        highest_index.map_or(0, |highest| {
            highest / size + u64::from(highest % size == size - 1)
        })
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self(NonZeroU64::new(crate::DEFAULT_BLOCK_SIZE).unwrap_or(NonZeroU64::MIN))
    }
}

impl std::fmt::Display for BlockSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
