//! Configuration for the sequencing loop

use crate::error::SequencerError;
use std::time::Duration;

/// Retry policy for index allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Attempts before giving up, including the first
    pub max_attempts: u32,

    /// Upper bound of the first backoff window
    pub initial_backoff: Duration,

    /// Cap on any single backoff window
    pub max_backoff: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 64,
            initial_backoff: Duration::from_millis(2),
            max_backoff: Duration::from_millis(250),
        }
    }
}

impl SequencerConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn validate(&self) -> Result<(), SequencerError> {
        if self.max_attempts == 0 {
            return Err(SequencerError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(SequencerError::InvalidConfig(format!(
                "initial_backoff {:?} exceeds max_backoff {:?}",
                self.initial_backoff, self.max_backoff
            )));
        }
        Ok(())
    }
}
