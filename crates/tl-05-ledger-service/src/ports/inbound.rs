//! Inbound ports (driving side - API)

use crate::error::Result;
use async_trait::async_trait;
use ledger_types::{Block, ProposedTransaction, Transaction, TxPosition};
use serde::Serialize;
use std::sync::Arc;

/// Primary port: ledger operations exposed to clients
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Commit a proposal at the next free position. Does not wait for the
    /// block to seal.
    async fn propose_transaction(&self, proposed: ProposedTransaction) -> Result<TxPosition>;

    /// Transaction at `position`, once its block is sealed
    async fn get_transaction(&self, position: TxPosition) -> Result<Option<Transaction>>;

    /// Sealed block `block_num`
    async fn get_block(&self, block_num: u64) -> Result<Option<Arc<Block>>>;

    /// Rebuild a cached block from the store and compare it with the cache
    async fn audit_block(&self, block_num: u64) -> Result<Option<Arc<Block>>>;

    /// Current view of the ledger from this process
    async fn status(&self) -> Result<LedgerStatus>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatus {
    pub block_size: u64,
    /// Highest index committed to the store, across all replicas
    pub latest_committed_index: Option<u64>,
    /// Highest block this process has cached
    pub latest_cached_block: Option<u64>,
    pub cached_blocks: usize,
}
