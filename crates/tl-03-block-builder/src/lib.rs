//! # Block Builder (tl-03)
//!
//! Turns a dense run of committed transactions into sealed [`Block`]s.
//!
//! A block is built only when all of its indices are present. Anything less
//! is "not yet sealed", which is a normal state and not an error. Every
//! stored value is decoded and checked against its key on every build, so a
//! corrupted entry is reported instead of hashed into the chain.
//!
//! [`Block`]: ledger_types::Block

mod builder;
pub mod error;

pub use builder::{BlockBuilder, PartialBlock, RangeBuild};
pub use error::{BuildError, Result};
