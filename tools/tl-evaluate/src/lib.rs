//! TL-Evaluate: end-to-end check of a running pair of ledger replicas.
//!
//! - `client`: thin HTTP client for the ledger API
//! - `verify`: offline verification of a downloaded chain

pub mod client;
pub mod verify;
