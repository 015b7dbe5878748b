//! # Canonical Block Hashing
//!
//! The block hash is SHA-256 over a fixed binary encoding, rendered as
//! lowercase hex. Any replica (or an external auditor) that feeds the same
//! fields through [`canonical_block_bytes`] obtains the same digest.
//!
//! ## Encoding
//!
//! Integers are `u64` little-endian. Strings are their UTF-8 byte length as
//! `u64` little-endian followed by the bytes.
//!
//! ```text
//! block_num | timestamp | previous_hash | tx_count
//!   then per transaction: block_num | tx_number | timestamp | content
//! ```

use crate::entities::Transaction;
use sha2::{Digest, Sha256};

fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, value: &str) {
    put_u64(buf, value.len() as u64);
    buf.extend_from_slice(value.as_bytes());
}

/// Canonical byte encoding of a block's hashed fields.
pub fn canonical_block_bytes(
    block_num: u64,
    timestamp: &str,
    previous_hash: &str,
    transactions: &[Transaction],
) -> Vec<u8> {
    let payload: usize = transactions
        .iter()
        .map(|tx| 32 + tx.timestamp.len() + tx.content.len())
        .sum();
    let mut buf = Vec::with_capacity(32 + timestamp.len() + previous_hash.len() + payload);

    put_u64(&mut buf, block_num);
    put_str(&mut buf, timestamp);
    put_str(&mut buf, previous_hash);
    put_u64(&mut buf, transactions.len() as u64);
    for tx in transactions {
        put_u64(&mut buf, tx.block_num);
        put_u64(&mut buf, tx.tx_number);
        put_str(&mut buf, &tx.timestamp);
        put_str(&mut buf, &tx.content);
    }
    buf
}

/// Compute the hex-encoded SHA-256 block hash.
pub fn compute_block_hash(
    block_num: u64,
    timestamp: &str,
    previous_hash: &str,
    transactions: &[Transaction],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_block_bytes(
        block_num,
        timestamp,
        previous_hash,
        transactions,
    ));
    hex::encode(hasher.finalize())
}
