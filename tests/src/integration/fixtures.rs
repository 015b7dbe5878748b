//! Shared fixtures: one store, any number of replicas.

use std::sync::Arc;
use std::time::Duration;

use ledger_types::{FixedTimeSource, ProposedTransaction, Transaction, TxPosition};
use tl_01_coordination_store::{InMemoryCoordinationStore, KeySpace};
use tl_02_sequencer::SequencerConfig;
use tl_05_ledger_service::{LedgerApi, LedgerConfig, LedgerService};

/// Timestamp every fixture replica stamps on its transactions.
pub const FIXED_TIMESTAMP: &str = "2024-01-01T00:00:00.000Z";

/// A store shared by the replicas built from it.
pub struct Cluster {
    pub store: Arc<InMemoryCoordinationStore>,
    pub block_size: u64,
}

impl Cluster {
    pub fn new(block_size: u64) -> Self {
        Self {
            store: Arc::new(InMemoryCoordinationStore::new()),
            block_size,
        }
    }

    /// Ledger configuration with short backoff so contention resolves quickly.
    pub fn config(&self) -> LedgerConfig {
        LedgerConfig::default()
            .with_block_size(self.block_size)
            .with_sequencer(
                SequencerConfig::default()
                    .with_max_attempts(10_000)
                    .with_backoff(Duration::from_micros(20), Duration::from_millis(1)),
            )
    }

    /// A new replica with an empty cache.
    pub fn replica(&self) -> Arc<LedgerService> {
        let service = LedgerService::new(self.store.clone(), self.config())
            .expect("fixture config is valid")
            .with_time_source(Arc::new(FixedTimeSource(FIXED_TIMESTAMP.to_string())));
        Arc::new(service)
    }

    /// Replace the stored value at `index` with `value`.
    pub fn corrupt(&self, index: u64, value: Vec<u8>) {
        self.store.overwrite(KeySpace::default().key(index), value);
    }

    /// Replace the content of the transaction stored at `index`, keeping it
    /// well-formed.
    pub fn rewrite_content(&self, index: u64, content: &str) {
        let key = KeySpace::default().key(index);
        let stored = self.store.get(&key).expect("index is committed");
        let mut tx: Transaction = serde_json::from_slice(&stored).expect("stored tx decodes");
        tx.content = content.to_string();
        self.store
            .overwrite(key, serde_json::to_vec(&tx).expect("tx encodes"));
    }
}

/// Propose `contents` in order through `ledger`.
pub async fn propose_all<L>(ledger: &L, contents: impl IntoIterator<Item = String>) -> Vec<TxPosition>
where
    L: LedgerApi + ?Sized,
{
    let mut positions = Vec::new();
    for content in contents {
        positions.push(
            ledger
                .propose_transaction(ProposedTransaction::new(content))
                .await
                .expect("proposal commits"),
        );
    }
    positions
}

/// The positions indices `0..count` decompose into.
pub fn expected_positions(count: u64, block_size: u64) -> Vec<TxPosition> {
    (0..count)
        .map(|index| TxPosition {
            block_num: index / block_size,
            tx_number: index % block_size,
        })
        .collect()
}
