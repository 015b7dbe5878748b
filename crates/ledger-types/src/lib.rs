//! # Ledger Types Crate
//!
//! Domain entities shared by every ledger crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: transactions, blocks and the block hash are
//!   defined once, here.
//! - **Sealed means immutable**: a [`Block`] can only be produced by
//!   [`Block::seal`] (or a validated deserialization) and exposes no mutators.
//! - **Pinned hashing**: the canonical byte encoding fed to SHA-256 lives in
//!   [`hashing`] and nowhere else.

pub mod block;
pub mod entities;
pub mod errors;
pub mod hashing;
pub mod time;

pub use block::{Block, BlockError};
pub use entities::{BlockSize, ProposedTransaction, Transaction, TxPosition};
pub use errors::IntegrityViolation;
pub use time::{FixedTimeSource, SystemTimeSource, TimeSource};

/// Number of transactions per block used when nothing else is configured.
pub const DEFAULT_BLOCK_SIZE: u64 = 25;
