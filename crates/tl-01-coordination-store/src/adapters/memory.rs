use crate::errors::{Result, StoreError};
use crate::ports::{CoordinationStore, KeyValue, PutOutcome, PutPredicate, SortOrder};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// Counters for conditional writes seen by an [`InMemoryCoordinationStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub puts_applied: u64,
    pub puts_rejected: u64,
}

/// In-memory coordination store for tests and single-process runs.
///
/// Every operation takes one lock over an ordered map, which makes it
/// trivially linearizable. Test hooks allow overwriting or removing raw
/// values, injecting transient failures and adding per-call latency to widen
/// race windows between concurrent writers.
#[derive(Default)]
pub struct InMemoryCoordinationStore {
    data: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
    latency: Option<Duration>,
    failures_pending: AtomicU32,
    puts_applied: AtomicU64,
    puts_rejected: AtomicU64,
}

impl InMemoryCoordinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `latency` before every operation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next `count` operations with [`StoreError::Unavailable`].
    pub fn fail_next(&self, count: u32) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Replace the raw value at `key`, bypassing the create-if-absent rule.
    pub fn overwrite(&self, key: Vec<u8>, value: Vec<u8>) {
        self.data.lock().insert(key, value);
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.lock().remove(key)
    }

    /// Raw value at `key`.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            puts_applied: self.puts_applied.load(Ordering::Relaxed),
            puts_rejected: self.puts_rejected.load(Ordering::Relaxed),
        }
    }

    async fn enter(&self, operation: &str) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let injected = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable(format!(
                "injected failure during {}",
                operation
            )));
        }
        Ok(())
    }

    fn scan(
        &self,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Vec<KeyValue> {
        let data = self.data.lock();
        let range = data.range::<[u8], _>((start, end));
        let limit = limit.unwrap_or(usize::MAX);
        let to_kv = |(k, v): (&Vec<u8>, &Vec<u8>)| KeyValue::new(k.clone(), v.clone());
        match order {
            SortOrder::Ascend => range.take(limit).map(to_kv).collect(),
            SortOrder::Descend => range.rev().take(limit).map(to_kv).collect(),
        }
    }
}

/// Smallest key greater than every key starting with `prefix`.
fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

#[async_trait]
impl CoordinationStore for InMemoryCoordinationStore {
    async fn get_by_prefix_sorted(
        &self,
        prefix: &[u8],
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>> {
        self.enter("get_by_prefix_sorted").await?;
        let end = prefix_end(prefix);
        let end = match &end {
            Some(end) => Bound::Excluded(end.as_slice()),
            None => Bound::Unbounded,
        };
        Ok(self.scan(Bound::Included(prefix), end, order, limit))
    }

    async fn get_range(
        &self,
        start: &[u8],
        end: &[u8],
        order: SortOrder,
    ) -> Result<Vec<KeyValue>> {
        self.enter("get_range").await?;
        if start >= end {
            return Ok(Vec::new());
        }
        Ok(self.scan(Bound::Included(start), Bound::Excluded(end), order, None))
    }

    async fn conditional_put(
        &self,
        key: &[u8],
        value: &[u8],
        predicate: PutPredicate,
    ) -> Result<PutOutcome> {
        self.enter("conditional_put").await?;
        let mut data = self.data.lock();
        match predicate {
            PutPredicate::Absent if data.contains_key(key) => {
                self.puts_rejected.fetch_add(1, Ordering::Relaxed);
                Ok(PutOutcome::PredicateFailed)
            }
            PutPredicate::Absent => {
                data.insert(key.to_vec(), value.to_vec());
                self.puts_applied.fetch_add(1, Ordering::Relaxed);
                Ok(PutOutcome::Applied)
            }
        }
    }
}
