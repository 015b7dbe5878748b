//! # Sealed Blocks
//!
//! A [`Block`] is a fixed-length, ordered run of transactions chained to its
//! predecessor by hash. Blocks are only constructed through [`Block::seal`],
//! which validates the length and ordering and computes the canonical hash,
//! so an instance in memory is always complete.

use crate::entities::{BlockSize, Transaction};
use crate::errors::IntegrityViolation;
use crate::hashing::compute_block_hash;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a transaction run cannot be sealed into a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block {block_num} needs exactly {expected} transactions, got {actual}")]
    WrongLength {
        block_num: u64,
        expected: u64,
        actual: u64,
    },

    #[error("slot {slot} of block {block_num} holds block {tx_block} tx {tx_number}")]
    OutOfOrder {
        block_num: u64,
        slot: u64,
        tx_block: u64,
        tx_number: u64,
    },

    #[error("block 0 must have an empty previous hash")]
    GenesisWithParent,

    #[error("block {block_num} is missing its previous hash")]
    MissingPreviousHash { block_num: u64 },

    #[error("block {block_num} hash {stored} does not match recomputed {computed}")]
    HashMismatch {
        block_num: u64,
        stored: String,
        computed: String,
    },
}

/// An immutable, sealed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "BlockRecord")]
pub struct Block {
    block_num: u64,
    timestamp: String,
    previous_hash: String,
    hash: String,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Seal `transactions` into block `block_num`.
    ///
    /// The block timestamp is the timestamp of the last transaction, i.e. the
    /// moment the block became complete, so every replica that seals the same
    /// run obtains the same bytes and the same hash.
    pub fn seal(
        block_num: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        block_size: BlockSize,
    ) -> Result<Self, BlockError> {
        if transactions.len() as u64 != block_size.get() {
            return Err(BlockError::WrongLength {
                block_num,
                expected: block_size.get(),
                actual: transactions.len() as u64,
            });
        }
        check_links(block_num, &previous_hash)?;
        check_order(block_num, &transactions)?;

        let timestamp = transactions
            .last()
            .map(|tx| tx.timestamp.clone())
            .unwrap_or_default();
        let hash = compute_block_hash(block_num, &timestamp, &previous_hash, &transactions);

        Ok(Self {
            block_num,
            timestamp,
            previous_hash,
            hash,
            transactions,
        })
    }

    pub fn block_num(&self) -> u64 {
        self.block_num
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transaction at `tx_number`, if within the block.
    pub fn transaction(&self, tx_number: u64) -> Option<&Transaction> {
        usize::try_from(tx_number)
            .ok()
            .and_then(|i| self.transactions.get(i))
    }

    /// Recompute the canonical hash from the block's fields.
    pub fn recompute_hash(&self) -> String {
        compute_block_hash(
            self.block_num,
            &self.timestamp,
            &self.previous_hash,
            &self.transactions,
        )
    }

    /// Check that the carried hash matches the canonical encoding.
    pub fn verify_hash(&self) -> Result<(), IntegrityViolation> {
        let computed = self.recompute_hash();
        if computed != self.hash {
            return Err(IntegrityViolation::HashMismatch {
                block_num: self.block_num,
                stored: self.hash.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Check that `self` extends `parent`.
    pub fn verify_link(&self, parent: &Block) -> Result<(), IntegrityViolation> {
        if parent.block_num + 1 != self.block_num || parent.hash != self.previous_hash {
            return Err(IntegrityViolation::ChainMismatch {
                block_num: self.block_num,
                expected: parent.hash.clone(),
                found: self.previous_hash.clone(),
            });
        }
        Ok(())
    }
}

fn check_links(block_num: u64, previous_hash: &str) -> Result<(), BlockError> {
    match (block_num, previous_hash.is_empty()) {
        (0, false) => Err(BlockError::GenesisWithParent),
        (n, true) if n > 0 => Err(BlockError::MissingPreviousHash { block_num }),
        _ => Ok(()),
    }
}

fn check_order(block_num: u64, transactions: &[Transaction]) -> Result<(), BlockError> {
    for (slot, tx) in transactions.iter().enumerate() {
        let slot = slot as u64;
        if tx.block_num != block_num || tx.tx_number != slot {
            return Err(BlockError::OutOfOrder {
                block_num,
                slot,
                tx_block: tx.block_num,
                tx_number: tx.tx_number,
            });
        }
    }
    Ok(())
}

/// Wire form of a block, validated into a [`Block`] on deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockRecord {
    block_num: u64,
    timestamp: String,
    previous_hash: String,
    hash: String,
    transactions: Vec<Transaction>,
}

impl TryFrom<BlockRecord> for Block {
    type Error = BlockError;

    fn try_from(record: BlockRecord) -> Result<Self, Self::Error> {
        if record.transactions.is_empty() {
            return Err(BlockError::WrongLength {
                block_num: record.block_num,
                expected: 1,
                actual: 0,
            });
        }
        check_links(record.block_num, &record.previous_hash)?;
        check_order(record.block_num, &record.transactions)?;

        let block = Block {
            block_num: record.block_num,
            timestamp: record.timestamp,
            previous_hash: record.previous_hash,
            hash: record.hash,
            transactions: record.transactions,
        };
        let computed = block.recompute_hash();
        if computed != block.hash {
            return Err(BlockError::HashMismatch {
                block_num: block.block_num,
                stored: block.hash,
                computed,
            });
        }
        Ok(block)
    }
}
