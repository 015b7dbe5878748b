//! # Ledger Service (tl-05)
//!
//! Application layer tying the sequencer and the block cache together behind
//! one inbound port.
//!
//! ```text
//! propose_transaction ──→ Sequencer ──→ CoordinationStore
//! get_transaction ─┐
//! get_block ───────┼──→ BlockCache ──→ BlockBuilder ──→ CoordinationStore
//! audit_block ─────┘
//! ```
//!
//! Proposals never wait for their block to seal. There is no cross-request
//! locking in this layer; the store is the only synchronization point.

pub mod config;
pub mod error;
pub mod ports;
mod service;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ports::inbound::{LedgerApi, LedgerStatus};
pub use service::LedgerService;
