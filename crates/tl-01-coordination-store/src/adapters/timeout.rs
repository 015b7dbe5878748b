use crate::errors::{Result, StoreError};
use crate::ports::{CoordinationStore, KeyValue, PutOutcome, PutPredicate, SortOrder};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Bounds every call on the wrapped store by a fixed deadline.
///
/// An expired call surfaces as [`StoreError::Timeout`]. For
/// `conditional_put` that outcome is ambiguous: the write may have been
/// applied after the deadline.
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S> TimeoutStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("[tl-01] {} exceeded {:?}", operation, self.timeout);
                Err(StoreError::Timeout {
                    operation,
                    timeout: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl<S: CoordinationStore> CoordinationStore for TimeoutStore<S> {
    async fn get_by_prefix_sorted(
        &self,
        prefix: &[u8],
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>> {
        self.bounded(
            "get_by_prefix_sorted",
            self.inner.get_by_prefix_sorted(prefix, order, limit),
        )
        .await
    }

    async fn get_range(
        &self,
        start: &[u8],
        end: &[u8],
        order: SortOrder,
    ) -> Result<Vec<KeyValue>> {
        self.bounded("get_range", self.inner.get_range(start, end, order))
            .await
    }

    async fn conditional_put(
        &self,
        key: &[u8],
        value: &[u8],
        predicate: PutPredicate,
    ) -> Result<PutOutcome> {
        self.bounded(
            "conditional_put",
            self.inner.conditional_put(key, value, predicate),
        )
        .await
    }
}
