//! # Ledger Node
//!
//! The server process. One node is one replica: it shares nothing with other
//! nodes except the coordination store.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (environment, first argument)
//! 2. Connect the coordination store and bound every call by a deadline
//! 3. Build the ledger service and warm its block cache
//! 4. Serve HTTP until Ctrl+C
//! 5. Optionally dump the block cache to disk

pub mod config;
pub mod dump;
pub mod runtime;

pub use config::{ConfigError, NodeConfig, StoreBackend};
pub use runtime::NodeRuntime;
