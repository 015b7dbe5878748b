//! Coordination Store Adapters
//!
//! Implementations of the `CoordinationStore` trait.

mod memory;
mod timeout;

#[cfg(feature = "etcd")]
mod etcd;

pub use memory::{InMemoryCoordinationStore, StoreStats};
pub use timeout::TimeoutStore;

#[cfg(feature = "etcd")]
pub use etcd::EtcdCoordinationStore;
