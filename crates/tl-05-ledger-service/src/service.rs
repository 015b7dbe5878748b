use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::ports::inbound::{LedgerApi, LedgerStatus};
use async_trait::async_trait;
use ledger_types::{Block, BlockSize, ProposedTransaction, TimeSource, Transaction, TxPosition};
use std::sync::Arc;
use tl_01_coordination_store::{latest_committed_index, CoordinationStore, KeySpace};
use tl_02_sequencer::Sequencer;
use tl_03_block_builder::BlockBuilder;
use tl_04_block_cache::BlockCache;
use tracing::{debug, info};

/// One replica's view of the ledger.
pub struct LedgerService {
    store: Arc<dyn CoordinationStore>,
    keys: KeySpace,
    block_size: BlockSize,
    sequencer: Sequencer,
    cache: BlockCache,
}

impl LedgerService {
    pub fn new(store: Arc<dyn CoordinationStore>, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let block_size = config.block_size()?;
        let keys = config.key_space();

        let sequencer = Sequencer::new(
            Arc::clone(&store),
            keys.clone(),
            block_size,
            config.sequencer.clone(),
        );
        let builder = BlockBuilder::new(Arc::clone(&store), keys.clone(), block_size);
        let cache = BlockCache::new(builder, config.cache.clone());

        Ok(Self {
            store,
            keys,
            block_size,
            sequencer,
            cache,
        })
    }

    /// Replace the clock that stamps newly committed transactions.
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.sequencer = self.sequencer.with_time_source(clock);
        self
    }

    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Cache every block already sealed in the store.
    pub async fn initialize(&self) -> Result<u64> {
        let warmed = self.cache.warm().await?;
        info!(
            "[tl-05] ledger ready: block size {}, {} blocks cached",
            self.block_size, warmed
        );
        Ok(warmed)
    }

    /// Every block this process has cached, in order.
    pub fn snapshot(&self) -> Vec<Arc<Block>> {
        self.cache.snapshot()
    }
}

#[async_trait]
impl LedgerApi for LedgerService {
    async fn propose_transaction(&self, proposed: ProposedTransaction) -> Result<TxPosition> {
        let position = self.sequencer.sequence(&proposed).await?;
        debug!(
            "[tl-05] committed block {} tx {}",
            position.block_num, position.tx_number
        );
        Ok(position)
    }

    async fn get_transaction(&self, position: TxPosition) -> Result<Option<Transaction>> {
        if position.tx_number >= self.block_size.get() {
            return Err(LedgerError::TxNumberOutOfRange {
                tx_number: position.tx_number,
                block_size: self.block_size.get(),
            });
        }
        let block = self.cache.get(position.block_num).await?;
        Ok(block.and_then(|b| b.transaction(position.tx_number).cloned()))
    }

    async fn get_block(&self, block_num: u64) -> Result<Option<Arc<Block>>> {
        Ok(self.cache.get(block_num).await?)
    }

    async fn audit_block(&self, block_num: u64) -> Result<Option<Arc<Block>>> {
        if self.cache.cached(block_num).is_none() {
            self.cache.get(block_num).await?;
        }
        Ok(self.cache.audit(block_num).await?)
    }

    async fn status(&self) -> Result<LedgerStatus> {
        let latest_committed_index =
            latest_committed_index(self.store.as_ref(), &self.keys).await?;
        Ok(LedgerStatus {
            block_size: self.block_size.get(),
            latest_committed_index,
            latest_cached_block: self.cache.latest_cached(),
            cached_blocks: self.cache.len(),
        })
    }
}
