//! Configuration for the block cache

use crate::error::CacheError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Blocks built per range read during a refresh
    pub refresh_batch_blocks: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_batch_blocks: 16,
        }
    }
}

impl CacheConfig {
    pub fn with_refresh_batch_blocks(mut self, blocks: u64) -> Self {
        self.refresh_batch_blocks = blocks;
        self
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if self.refresh_batch_blocks == 0 {
            return Err(CacheError::InvalidConfig(
                "refresh_batch_blocks must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
