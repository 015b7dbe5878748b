//! # Coordination Store Port
//!
//! Abstract interface over the external linearizable key-value store.
//!
//! Production: `EtcdCoordinationStore` (feature `etcd`)
//! Testing: `InMemoryCoordinationStore`

use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Sort direction for scans (by key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascend,
    Descend,
}

/// Condition evaluated atomically with a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutPredicate {
    /// The key has never been created.
    Absent,
}

/// Outcome of a conditional write that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The predicate held and the value was written.
    Applied,
    /// The predicate did not hold; nothing was written.
    PredicateFailed,
}

impl PutOutcome {
    pub fn applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A key-value pair returned by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Capability set the ledger requires from the coordination store.
///
/// Every implementation must be linearizable: a `conditional_put` that
/// returns [`PutOutcome::Applied`] is visible to every subsequent read from
/// any client, and at most one `Absent` write can ever succeed per key.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Keys starting with `prefix`, sorted by key, at most `limit` entries.
    async fn get_by_prefix_sorted(
        &self,
        prefix: &[u8],
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>>;

    /// Keys in `[start, end)`, sorted by key.
    async fn get_range(&self, start: &[u8], end: &[u8], order: SortOrder)
        -> Result<Vec<KeyValue>>;

    /// Write `value` at `key` iff `predicate` holds at commit time.
    async fn conditional_put(
        &self,
        key: &[u8],
        value: &[u8],
        predicate: PutPredicate,
    ) -> Result<PutOutcome>;
}

#[async_trait]
impl<T: CoordinationStore + ?Sized> CoordinationStore for Arc<T> {
    async fn get_by_prefix_sorted(
        &self,
        prefix: &[u8],
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>> {
        (**self).get_by_prefix_sorted(prefix, order, limit).await
    }

    async fn get_range(
        &self,
        start: &[u8],
        end: &[u8],
        order: SortOrder,
    ) -> Result<Vec<KeyValue>> {
        (**self).get_range(start, end, order).await
    }

    async fn conditional_put(
        &self,
        key: &[u8],
        value: &[u8],
        predicate: PutPredicate,
    ) -> Result<PutOutcome> {
        (**self).conditional_put(key, value, predicate).await
    }
}
