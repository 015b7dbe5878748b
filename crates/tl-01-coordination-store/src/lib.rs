//! # Coordination Store Client (tl-01)
//!
//! The ledger's only synchronization point is an external, linearizable
//! key-value store. This crate defines the capability set the ledger needs
//! from it and nothing more:
//!
//! | Capability | Used by |
//! |------------|---------|
//! | `get_by_prefix_sorted` | committed-tip scans (sequencer, cache refresh) |
//! | `get_range` | block construction |
//! | `conditional_put` | index allocation (create-if-absent) |
//!
//! ## Crate Structure
//!
//! - `ports` - the [`CoordinationStore`] trait and its value types
//! - `keyspace` - fixed-width, order-preserving index keys
//! - `adapters/` - in-memory fake, per-call timeout decorator, etcd (feature `etcd`)
//! - `errors` - transient vs. permanent store failures
//!
//! ## Usage
//!
//! ```ignore
//! use tl_01_coordination_store::{InMemoryCoordinationStore, KeySpace, TimeoutStore};
//!
//! let store = TimeoutStore::new(InMemoryCoordinationStore::new(), Duration::from_secs(1));
//! let keys = KeySpace::default();
//! let tip = latest_committed_index(&store, &keys).await?;
//! ```

pub mod adapters;
pub mod errors;
pub mod keyspace;
pub mod ports;

pub use adapters::{InMemoryCoordinationStore, StoreStats, TimeoutStore};
#[cfg(feature = "etcd")]
pub use adapters::EtcdCoordinationStore;
pub use errors::{KeyError, Result, StoreError};
pub use keyspace::{latest_committed_index, KeySpace, DEFAULT_PREFIX, INDEX_WIDTH};
pub use ports::{CoordinationStore, KeyValue, PutOutcome, PutPredicate, SortOrder};

/// Per-operation deadline used when nothing else is configured.
pub const DEFAULT_OPERATION_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);
