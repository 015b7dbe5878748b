use crate::backoff;
use crate::config::SequencerConfig;
use crate::error::{Result, SequencerError};
use ledger_types::{BlockSize, ProposedTransaction, SystemTimeSource, TimeSource, Transaction, TxPosition};
use std::sync::Arc;
use tl_01_coordination_store::{
    latest_committed_index, CoordinationStore, KeySpace, PutPredicate, StoreError,
};
use tracing::{debug, info, warn};

/// Result of a single allocation attempt.
enum Attempt {
    Committed(TxPosition),
    LostRace { index: u64 },
}

/// Why the previous attempt did not commit.
enum Failure {
    LostRace,
    Store(StoreError),
}

/// Optimistic, leaderless index allocator.
pub struct Sequencer {
    store: Arc<dyn CoordinationStore>,
    keys: KeySpace,
    block_size: BlockSize,
    config: SequencerConfig,
    clock: Arc<dyn TimeSource>,
}

impl Sequencer {
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        keys: KeySpace,
        block_size: BlockSize,
        config: SequencerConfig,
    ) -> Self {
        Self {
            store,
            keys,
            block_size,
            config,
            clock: Arc::new(SystemTimeSource),
        }
    }

    /// Replace the clock that stamps committed transactions.
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Commit `proposed` at the next free index and return its position.
    ///
    /// Lost races and transient store failures are retried up to
    /// `max_attempts` times. A permanent store failure aborts at once.
    pub async fn sequence(&self, proposed: &ProposedTransaction) -> Result<TxPosition> {
        let mut last_failure = Failure::LostRace;

        for attempt in 1..=self.config.max_attempts {
            match self.try_commit(proposed).await {
                Ok(Attempt::Committed(position)) => {
                    if attempt > 1 {
                        info!(
                            "[tl-02] committed block {} tx {} after {} attempts",
                            position.block_num, position.tx_number, attempt
                        );
                    }
                    return Ok(position);
                }
                Ok(Attempt::LostRace { index }) => {
                    debug!("[tl-02] lost race for index {} (attempt {})", index, attempt);
                    last_failure = Failure::LostRace;
                }
                Err(SequencerError::Store(e)) if e.is_transient() => {
                    if e.is_ambiguous_write() {
                        warn!(
                            "[tl-02] write outcome unknown, retrying may duplicate content: {}",
                            e
                        );
                    } else {
                        warn!("[tl-02] transient store failure (attempt {}): {}", attempt, e);
                    }
                    last_failure = Failure::Store(e);
                }
                Err(e) => return Err(e),
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(backoff::delay(&self.config, attempt)).await;
            }
        }

        let attempts = self.config.max_attempts;
        warn!("[tl-02] giving up after {} attempts", attempts);
        Err(match last_failure {
            Failure::LostRace => SequencerError::Contention { attempts },
            Failure::Store(e) => SequencerError::Store(e),
        })
    }

    async fn try_commit(&self, proposed: &ProposedTransaction) -> Result<Attempt> {
        let candidate = match latest_committed_index(self.store.as_ref(), &self.keys).await? {
            None => 0,
            Some(highest) => highest
                .checked_add(1)
                .ok_or(SequencerError::IndexSpaceExhausted)?,
        };

        let position = self.block_size.position(candidate);
        let tx = Transaction::new(proposed.clone(), position, self.clock.now());
        let value = serde_json::to_vec(&tx).map_err(|e| SequencerError::Encoding(e.to_string()))?;

        let outcome = self
            .store
            .conditional_put(&self.keys.key(candidate), &value, PutPredicate::Absent)
            .await?;

        if outcome.applied() {
            Ok(Attempt::Committed(position))
        } else {
            Ok(Attempt::LostRace { index: candidate })
        }
    }
}
