use crate::error::{BuildError, Result};
use ledger_types::{Block, BlockSize, IntegrityViolation, Transaction};
use std::iter::Peekable;
use std::sync::Arc;
use tl_01_coordination_store::{
    latest_committed_index, CoordinationStore, KeySpace, KeyValue, SortOrder, StoreError,
};
use tracing::{debug, warn};

/// Consecutive blocks produced from one range read.
#[derive(Debug, Default)]
pub struct RangeBuild {
    /// Blocks sealed in ascending order, each linked to its predecessor
    pub blocks: Vec<Block>,

    /// The first block that was not sealed, if building stopped there
    pub partial: Option<PartialBlock>,

    /// Why building stopped before the requested count, if it failed
    pub error: Option<BuildError>,
}

/// A block with only some of its indices committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialBlock {
    pub block_num: u64,
    pub present: u64,
}

enum Collected {
    Complete(Vec<Transaction>),
    Partial(u64),
}

/// Builds sealed blocks from the coordination store.
pub struct BlockBuilder {
    store: Arc<dyn CoordinationStore>,
    keys: KeySpace,
    block_size: BlockSize,
}

impl BlockBuilder {
    pub fn new(store: Arc<dyn CoordinationStore>, keys: KeySpace, block_size: BlockSize) -> Self {
        Self {
            store,
            keys,
            block_size,
        }
    }

    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Highest block number whose indices are all committed per the tip.
    pub async fn latest_sealed(&self) -> std::result::Result<Option<u64>, StoreError> {
        let highest = latest_committed_index(self.store.as_ref(), &self.keys).await?;
        Ok(self.block_size.sealed_blocks(highest).checked_sub(1))
    }

    /// Build `block_num` on top of `parent`, or `None` if it is not sealed.
    ///
    /// `parent` must be block `block_num - 1`, and `None` only for block 0.
    pub async fn build(&self, block_num: u64, parent: Option<&Block>) -> Result<Option<Block>> {
        let mut range = self.build_range(block_num, 1, parent).await;
        match range.error {
            Some(e) => Err(e),
            None => Ok(range.blocks.pop()),
        }
    }

    /// Build up to `count` consecutive blocks starting at `first`.
    ///
    /// Stops at the first block that is incomplete or fails verification.
    /// Blocks sealed before that point are returned either way.
    pub async fn build_range(&self, first: u64, count: u64, parent: Option<&Block>) -> RangeBuild {
        let mut out = RangeBuild::default();
        if count == 0 {
            return out;
        }
        if let Err(e) = check_parent(first, parent) {
            out.error = Some(e);
            return out;
        }

        let size = self.block_size.get();
        let Some(first_index) = self.block_size.first_index(first) else {
            return out;
        };
        let (start, end) = self.keys.range(first_index, count.saturating_mul(size));
        let entries = match self.store.get_range(&start, &end, SortOrder::Ascend).await {
            Ok(entries) => entries,
            Err(e) => {
                out.error = Some(e.into());
                return out;
            }
        };

        let mut entries = entries.into_iter().peekable();
        let mut previous_hash = parent.map(|p| p.hash().to_string()).unwrap_or_default();

        for block_num in first..first.saturating_add(count) {
            let transactions = match self.collect_block(block_num, &mut entries) {
                Ok(Collected::Complete(transactions)) => transactions,
                Ok(Collected::Partial(present)) => {
                    out.partial = Some(PartialBlock { block_num, present });
                    break;
                }
                Err(e) => {
                    warn!("[tl-03] block {} failed verification: {}", block_num, e);
                    out.error = Some(e);
                    break;
                }
            };

            match Block::seal(block_num, previous_hash, transactions, self.block_size) {
                Ok(block) => {
                    debug!("[tl-03] sealed block {} ({})", block_num, block.hash());
                    previous_hash = block.hash().to_string();
                    out.blocks.push(block);
                }
                Err(e) => {
                    out.error = Some(e.into());
                    break;
                }
            }
        }
        out
    }

    /// Decode and verify the transactions of `block_num` from the front of
    /// `entries`.
    fn collect_block<I>(
        &self,
        block_num: u64,
        entries: &mut Peekable<I>,
    ) -> Result<Collected>
    where
        I: Iterator<Item = KeyValue>,
    {
        let size = self.block_size.get();
        let mut transactions = Vec::with_capacity(size as usize);

        while let Some(entry) = entries.peek() {
            let index = self.keys.index_of(&entry.key).map_err(|e| {
                BuildError::from(IntegrityViolation::MalformedKey { key: e.key })
            })?;
            if self.block_size.position(index).block_num != block_num {
                break;
            }
            if let Some(entry) = entries.next() {
                transactions.push(self.decode(index, &entry.value)?);
            }
        }

        let present = transactions.len() as u64;
        if present != size {
            return Ok(Collected::Partial(present));
        }
        Ok(Collected::Complete(transactions))
    }

    /// Deserialize the value at `index` and check its claimed position.
    fn decode(&self, index: u64, value: &[u8]) -> Result<Transaction> {
        let tx: Transaction = serde_json::from_slice(value).map_err(|e| {
            IntegrityViolation::MalformedTransaction {
                index,
                reason: e.to_string(),
            }
        })?;

        let expected = self.block_size.position(index);
        if tx.position() != expected {
            return Err(IntegrityViolation::PositionMismatch {
                index,
                expected_block: expected.block_num,
                expected_tx: expected.tx_number,
                claimed_block: tx.block_num,
                claimed_tx: tx.tx_number,
            }
            .into());
        }
        Ok(tx)
    }
}

fn check_parent(block_num: u64, parent: Option<&Block>) -> Result<()> {
    let ok = match (block_num, parent) {
        (0, None) => true,
        (n, Some(p)) => p.block_num().checked_add(1) == Some(n),
        _ => false,
    };
    if !ok {
        return Err(BuildError::ParentMismatch {
            block_num,
            parent: parent.map(Block::block_num),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_types::{ProposedTransaction, TxPosition};
    use tl_01_coordination_store::InMemoryCoordinationStore;

    const SIZE: u64 = 4;

    fn fixture() -> (Arc<InMemoryCoordinationStore>, BlockBuilder) {
        let store = Arc::new(InMemoryCoordinationStore::new());
        let builder = BlockBuilder::new(
            store.clone(),
            KeySpace::default(),
            BlockSize::new(SIZE).unwrap(),
        );
        (store, builder)
    }

    fn tx_bytes(index: u64) -> Vec<u8> {
        let tx = Transaction::new(
            ProposedTransaction::new(format!("tx-{}", index)),
            TxPosition {
                block_num: index / SIZE,
                tx_number: index % SIZE,
            },
            format!("2024-01-01T00:00:{:02}.000Z", index % 60),
        );
        serde_json::to_vec(&tx).unwrap()
    }

    fn commit(store: &InMemoryCoordinationStore, indices: impl IntoIterator<Item = u64>) {
        let keys = KeySpace::default();
        for index in indices {
            store.overwrite(keys.key(index), tx_bytes(index));
        }
    }

    #[tokio::test]
    async fn test_unsealed_block_is_none() {
        let (store, builder) = fixture();
        assert!(builder.build(0, None).await.unwrap().is_none());

        commit(&store, 0..SIZE - 1);
        assert!(builder.build(0, None).await.unwrap().is_none());
        assert_eq!(builder.latest_sealed().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_build_genesis_and_child() {
        let (store, builder) = fixture();
        commit(&store, 0..2 * SIZE);

        let genesis = builder.build(0, None).await.unwrap().unwrap();
        assert_eq!(genesis.previous_hash(), "");
        assert_eq!(genesis.transactions().len() as u64, SIZE);
        assert_eq!(genesis.transaction(3).unwrap().content, "tx-3");

        let child = builder.build(1, Some(&genesis)).await.unwrap().unwrap();
        assert_eq!(child.previous_hash(), genesis.hash());
        assert!(child.verify_link(&genesis).is_ok());
        assert_eq!(builder.latest_sealed().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_build_is_deterministic() {
        let (store, builder) = fixture();
        commit(&store, 0..SIZE);

        let a = builder.build(0, None).await.unwrap().unwrap();
        let b = builder.build(0, None).await.unwrap().unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_build_range_chains_blocks_and_stops_at_unsealed() {
        let (store, builder) = fixture();
        commit(&store, 0..3 * SIZE + 1);

        let range = builder.build_range(0, 10, None).await;
        assert!(range.error.is_none());
        assert_eq!(range.blocks.len(), 3);
        assert_eq!(
            range.partial,
            Some(PartialBlock {
                block_num: 3,
                present: 1
            })
        );
        for pair in range.blocks.windows(2) {
            assert!(pair[1].verify_link(&pair[0]).is_ok());
        }

        let one_by_one = builder.build(1, Some(&range.blocks[0])).await.unwrap().unwrap();
        assert_eq!(one_by_one, range.blocks[1]);
    }

    #[tokio::test]
    async fn test_corrupted_value_is_reported_with_index() {
        let (store, builder) = fixture();
        commit(&store, 0..2 * SIZE);
        store.overwrite(KeySpace::default().key(5), b"not json".to_vec());

        let range = builder.build_range(0, 2, None).await;
        assert_eq!(range.blocks.len(), 1);
        match range.error {
            Some(BuildError::Integrity(IntegrityViolation::MalformedTransaction {
                index, ..
            })) => assert_eq!(index, 5),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_position_mismatch_is_reported() {
        let (store, builder) = fixture();
        commit(&store, 0..SIZE);
        // A valid transaction stored under the wrong key
        store.overwrite(KeySpace::default().key(2), tx_bytes(1));

        let err = builder.build(0, None).await.unwrap_err();
        assert!(matches!(
            err,
            BuildError::Integrity(IntegrityViolation::PositionMismatch {
                index: 2,
                claimed_tx: 1,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_parent_must_precede_block() {
        let (store, builder) = fixture();
        commit(&store, 0..3 * SIZE);
        let genesis = builder.build(0, None).await.unwrap().unwrap();

        assert!(matches!(
            builder.build(2, Some(&genesis)).await,
            Err(BuildError::ParentMismatch {
                block_num: 2,
                parent: Some(0)
            })
        ));
        assert!(matches!(
            builder.build(1, None).await,
            Err(BuildError::ParentMismatch { parent: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (store, builder) = fixture();
        commit(&store, 0..SIZE);
        store.fail_next(1);

        let err = builder.build(0, None).await.unwrap_err();
        assert!(matches!(err, BuildError::Store(StoreError::Unavailable(_))));
    }
}
