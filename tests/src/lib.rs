//! # Tangle Ledger Test Suite
//!
//! Cross-crate scenarios that need more than one subsystem wired together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks
//! └── src/integration/
//!     ├── fixtures.rs   # replicas over a shared in-memory store
//!     ├── scenarios.rs  # single-replica ledger scenarios
//!     ├── replicas.rs   # several replicas, one store
//!     └── http.rs       # the same flows through the HTTP router
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tl-tests
//! cargo test -p tl-tests integration::replicas::
//! cargo bench -p tl-tests
//! ```

pub mod integration;
