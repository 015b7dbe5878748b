//! # Sequencer (tl-02)
//!
//! Assigns every proposed transaction a unique global index without a
//! leader. Each attempt reads the committed tip, claims `tip + 1` with a
//! create-if-absent write and retries after a lost race.
//!
//! ## Guarantees
//!
//! | Property | Source |
//! |----------|--------|
//! | An index is never reused | the store's create-if-absent write |
//! | Returned positions are gap-free in aggregate | candidates are always `tip + 1` |
//! | Bounded latency | `SequencerConfig::max_attempts` with capped backoff |
//!
//! Liveness under heavy contention is best effort. When the ceiling is hit
//! the caller gets [`SequencerError::Contention`] and may retry.

mod backoff;
pub mod config;
pub mod error;
mod sequencer;

pub use config::SequencerConfig;
pub use error::{Result, SequencerError};
pub use sequencer::Sequencer;
