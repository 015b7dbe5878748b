//! Capped exponential backoff with full jitter

use crate::config::SequencerConfig;
use rand::Rng;
use std::time::Duration;

/// Upper bound of the backoff window after `failures` consecutive failures.
pub(crate) fn window(config: &SequencerConfig, failures: u32) -> Duration {
    let factor = 1u32.checked_shl(failures.saturating_sub(1)).unwrap_or(u32::MAX);
    config
        .initial_backoff
        .saturating_mul(factor)
        .min(config.max_backoff)
}

/// Random delay in `[0, window]`.
pub(crate) fn delay(config: &SequencerConfig, failures: u32) -> Duration {
    let window = window(config, failures);
    let micros = u64::try_from(window.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(rand::thread_rng().gen_range(0..=micros))
}
