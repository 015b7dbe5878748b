use crate::errors::{Result, StoreError};
use crate::ports::{CoordinationStore, KeyValue, PutOutcome, PutPredicate, SortOrder};
use async_trait::async_trait;
use etcd_client::{
    Client, Compare, CompareOp, ConnectOptions, GetOptions, KvClient, SortTarget, Txn, TxnOp,
};
use std::time::Duration;

/// Coordination store backed by an etcd v3 cluster.
///
/// `PutPredicate::Absent` compiles to a transaction guarded by
/// `create_revision(key) == 0`, which etcd evaluates atomically with the put.
#[derive(Clone)]
pub struct EtcdCoordinationStore {
    kv: KvClient,
}

impl EtcdCoordinationStore {
    /// Connect to `endpoints`, failing if no member answers within
    /// `dial_timeout`.
    pub async fn connect(endpoints: &[String], dial_timeout: Duration) -> Result<Self> {
        let options = ConnectOptions::new()
            .with_connect_timeout(dial_timeout)
            .with_timeout(dial_timeout);
        let client = Client::connect(endpoints, Some(options))
            .await
            .map_err(map_etcd_error)?;
        tracing::info!("[tl-01] connected to etcd at {}", endpoints.join(","));
        Ok(Self {
            kv: client.kv_client(),
        })
    }
}

fn sort(order: SortOrder) -> etcd_client::SortOrder {
    match order {
        SortOrder::Ascend => etcd_client::SortOrder::Ascend,
        SortOrder::Descend => etcd_client::SortOrder::Descend,
    }
}

fn map_etcd_error(err: etcd_client::Error) -> StoreError {
    match err {
        etcd_client::Error::TransportError(e) => StoreError::Unavailable(e.to_string()),
        etcd_client::Error::GRpcStatus(status) => StoreError::Unavailable(status.to_string()),
        etcd_client::Error::IoError(e) => StoreError::Unavailable(e.to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

fn into_pairs(kvs: &[etcd_client::KeyValue]) -> Vec<KeyValue> {
    kvs.iter()
        .map(|kv| KeyValue::new(kv.key(), kv.value()))
        .collect()
}

#[async_trait]
impl CoordinationStore for EtcdCoordinationStore {
    async fn get_by_prefix_sorted(
        &self,
        prefix: &[u8],
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<KeyValue>> {
        let mut options = GetOptions::new()
            .with_prefix()
            .with_sort(SortTarget::Key, sort(order));
        if let Some(limit) = limit {
            options = options.with_limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let mut kv = self.kv.clone();
        let response = kv
            .get(prefix, Some(options))
            .await
            .map_err(map_etcd_error)?;
        Ok(into_pairs(response.kvs()))
    }

    async fn get_range(
        &self,
        start: &[u8],
        end: &[u8],
        order: SortOrder,
    ) -> Result<Vec<KeyValue>> {
        let options = GetOptions::new()
            .with_range(end)
            .with_sort(SortTarget::Key, sort(order));

        let mut kv = self.kv.clone();
        let response = kv
            .get(start, Some(options))
            .await
            .map_err(map_etcd_error)?;
        Ok(into_pairs(response.kvs()))
    }

    async fn conditional_put(
        &self,
        key: &[u8],
        value: &[u8],
        predicate: PutPredicate,
    ) -> Result<PutOutcome> {
        let guard = match predicate {
            PutPredicate::Absent => Compare::create_revision(key, CompareOp::Equal, 0),
        };
        let txn = Txn::new()
            .when(vec![guard])
            .and_then(vec![TxnOp::put(key, value, None)]);

        let mut kv = self.kv.clone();
        let response = kv.txn(txn).await.map_err(map_etcd_error)?;
        if response.succeeded() {
            Ok(PutOutcome::Applied)
        } else {
            Ok(PutOutcome::PredicateFailed)
        }
    }
}
