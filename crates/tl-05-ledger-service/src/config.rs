//! Configuration for the ledger service

use crate::error::LedgerError;
use ledger_types::{BlockSize, DEFAULT_BLOCK_SIZE};
use tl_01_coordination_store::{KeySpace, DEFAULT_PREFIX};
use tl_02_sequencer::SequencerConfig;
use tl_04_block_cache::CacheConfig;

/// Settings every replica of one ledger must agree on, plus local tuning.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Transactions per block. Must match across replicas.
    pub block_size: u64,

    /// Store namespace reserved for this ledger. Must match across replicas.
    pub key_prefix: String,

    pub sequencer: SequencerConfig,

    pub cache: CacheConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            key_prefix: DEFAULT_PREFIX.to_string(),
            sequencer: SequencerConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl LedgerConfig {
    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_sequencer(mut self, sequencer: SequencerConfig) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        self.block_size()?;
        if self.key_prefix.is_empty() {
            return Err(LedgerError::InvalidConfig(
                "key_prefix must not be empty".into(),
            ));
        }
        self.sequencer
            .validate()
            .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        self.cache
            .validate()
            .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        Ok(())
    }

    pub fn block_size(&self) -> Result<BlockSize, LedgerError> {
        BlockSize::new(self.block_size)
            .ok_or_else(|| LedgerError::InvalidConfig("block_size must be at least 1".into()))
    }

    pub fn key_space(&self) -> KeySpace {
        KeySpace::new(self.key_prefix.clone())
    }
}
