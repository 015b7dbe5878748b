//! # Block Cache (tl-04)
//!
//! Sealed blocks never change, so once built they are kept for the life of
//! the process. Reads take a shared lock. A miss triggers a refresh that
//! builds every newly sealed block and publishes each one only after it is
//! fully built and verified.
//!
//! ## Block Lifecycle
//!
//! ```text
//! absent --(last index committed)--> sealed in store --(refresh)--> cached
//! ```
//!
//! There is no reverse transition. Rebuilding a cached block and getting
//! different content is an integrity violation, never a silent replace.

mod cache;
pub mod config;
pub mod error;

pub use cache::BlockCache;
pub use config::CacheConfig;
pub use error::{CacheError, Result};
