//! Time sources for transaction timestamps.

use chrono::{SecondsFormat, Utc};

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current time as an RFC 3339 UTC string.
    fn now(&self) -> String;
}

/// Wall clock, millisecond precision.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone)]
pub struct FixedTimeSource(pub String);

impl Default for FixedTimeSource {
    fn default() -> Self {
        Self("2024-01-01T00:00:00.000Z".to_string())
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> String {
        self.0.clone()
    }
}
