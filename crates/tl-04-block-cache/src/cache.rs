use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use ledger_types::{Block, IntegrityViolation};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tl_03_block_builder::{BlockBuilder, PartialBlock, RangeBuild};
use tracing::{debug, error, info};

/// Process-local cache of sealed blocks.
///
/// The map always holds a contiguous run of blocks starting at block 0.
/// Refreshes run without any lock held across store calls; concurrent
/// refreshes may build the same block, and only the first copy is kept.
pub struct BlockCache {
    builder: BlockBuilder,
    config: CacheConfig,
    blocks: RwLock<BTreeMap<u64, Arc<Block>>>,
}

impl BlockCache {
    pub fn new(builder: BlockBuilder, config: CacheConfig) -> Self {
        Self {
            builder,
            config,
            blocks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Sealed block `block_num`, refreshing from the store on a miss.
    ///
    /// `Ok(None)` means the block is not sealed yet. A refresh failure is
    /// returned only when it prevented `block_num` from being cached.
    pub async fn get(&self, block_num: u64) -> Result<Option<Arc<Block>>> {
        if let Some(block) = self.cached(block_num) {
            return Ok(Some(block));
        }

        let refreshed = self.refresh().await;
        if let Some(block) = self.cached(block_num) {
            return Ok(Some(block));
        }
        refreshed?;
        Ok(None)
    }

    /// Cached copy of `block_num` without touching the store.
    pub fn cached(&self, block_num: u64) -> Option<Arc<Block>> {
        self.blocks.read().get(&block_num).cloned()
    }

    /// Highest cached block number.
    pub fn latest_cached(&self) -> Option<u64> {
        self.blocks.read().keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Every cached block in ascending order.
    pub fn snapshot(&self) -> Vec<Arc<Block>> {
        self.blocks.read().values().cloned().collect()
    }

    /// Eagerly cache every block sealed so far.
    pub async fn warm(&self) -> Result<u64> {
        let published = self.refresh().await?;
        info!(
            "[tl-04] warmed cache with {} blocks (latest {:?})",
            published,
            self.latest_cached()
        );
        Ok(published)
    }

    /// Build every block sealed since the highest cached one and publish it.
    ///
    /// Returns the number of newly published blocks. Blocks that verified
    /// before a failure stay published.
    ///
    /// Safe to call concurrently. Blocks another refresh published first are
    /// compared, not replaced, and are not counted.
    pub async fn refresh(&self) -> Result<u64> {
        let Some(latest_sealed) = self.builder.latest_sealed().await? else {
            return Ok(0);
        };

        let mut published = 0;
        let mut next = 0;
        let mut parent: Option<Arc<Block>> = None;
        loop {
            // Skip whatever other refreshes have published in the meantime.
            if let Some((tip, block)) = self.cached_tip() {
                if tip >= next {
                    next = tip + 1;
                    parent = Some(block);
                }
            }
            if next > latest_sealed {
                break;
            }

            let count = (latest_sealed - next + 1).min(self.config.refresh_batch_blocks);
            let RangeBuild {
                blocks,
                partial,
                error,
            } = self
                .builder
                .build_range(next, count, parent.as_deref())
                .await;
            let built = blocks.len() as u64;

            let (last, inserted) = self.publish(blocks).map_err(|e| self.violation(e))?;
            published += inserted;
            if let Some(last) = last {
                parent = Some(last);
            }

            if let Some(e) = error {
                let e = CacheError::from(e);
                if let CacheError::Integrity(violation) = &e {
                    error!("[tl-04] refresh stopped: {}", violation);
                }
                return Err(e);
            }
            if built < count {
                let PartialBlock { block_num, present } = partial.unwrap_or(PartialBlock {
                    block_num: next + built,
                    present: 0,
                });
                return Err(self.violation(IntegrityViolation::Gap {
                    block_num,
                    present,
                    expected: self.builder.block_size().get(),
                }));
            }
            next += built;
        }

        if published > 0 {
            debug!(
                "[tl-04] published {} blocks, latest {}",
                published, latest_sealed
            );
        }
        Ok(published)
    }

    /// Highest cached block and its number.
    fn cached_tip(&self) -> Option<(u64, Arc<Block>)> {
        self.blocks
            .read()
            .iter()
            .next_back()
            .map(|(n, b)| (*n, Arc::clone(b)))
    }

    /// Rebuild cached block `block_num` from the store and compare.
    ///
    /// Returns `Ok(None)` if the block is not cached. The cache is never
    /// modified.
    pub async fn audit(&self, block_num: u64) -> Result<Option<Arc<Block>>> {
        let Some(cached) = self.cached(block_num) else {
            return Ok(None);
        };
        let parent = match block_num.checked_sub(1) {
            Some(p) => Some(self.cached(p).ok_or(CacheError::MissingParent { block_num })?),
            None => None,
        };

        let mut range = self.builder.build_range(block_num, 1, parent.as_deref()).await;
        if let Some(e) = range.error {
            return Err(e.into());
        }
        let Some(rebuilt) = range.blocks.pop() else {
            let present = range.partial.map_or(0, |p| p.present);
            return Err(self.violation(IntegrityViolation::Gap {
                block_num,
                present,
                expected: self.builder.block_size().get(),
            }));
        };

        if rebuilt != *cached {
            return Err(self.violation(IntegrityViolation::Diverged {
                block_num,
                cached_hash: cached.hash().to_string(),
                rebuilt_hash: rebuilt.hash().to_string(),
            }));
        }
        Ok(Some(cached))
    }

    /// Verify and insert `blocks`, stopping at the first violation.
    ///
    /// Returns the last block now cached from this batch and how many blocks
    /// were newly inserted. A block another refresh already published must be
    /// identical and is kept as is.
    fn publish(
        &self,
        blocks: Vec<Block>,
    ) -> std::result::Result<(Option<Arc<Block>>, u64), IntegrityViolation> {
        let mut verified = Vec::with_capacity(blocks.len());
        let mut failure = None;
        for block in blocks {
            if let Err(e) = block.verify_hash() {
                failure = Some(e);
                break;
            }
            verified.push(Arc::new(block));
        }

        let mut last = None;
        let mut inserted = 0;
        {
            let mut map = self.blocks.write();
            for block in verified {
                let block_num = block.block_num();
                if let Some(parent) = block_num.checked_sub(1).and_then(|p| map.get(&p)) {
                    block.verify_link(parent)?;
                }
                let existing = map.get(&block_num).cloned();
                match existing {
                    Some(existing) if *existing == *block => {
                        last = Some(existing);
                    }
                    Some(existing) => {
                        return Err(IntegrityViolation::Diverged {
                            block_num,
                            cached_hash: existing.hash().to_string(),
                            rebuilt_hash: block.hash().to_string(),
                        });
                    }
                    None => {
                        map.insert(block_num, Arc::clone(&block));
                        inserted += 1;
                        last = Some(block);
                    }
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok((last, inserted)),
        }
    }

    fn violation(&self, violation: IntegrityViolation) -> CacheError {
        error!("[tl-04] integrity violation: {}", violation);
        CacheError::Integrity(violation)
    }
}
