//! # API Gateway (tl-06)
//!
//! JSON over HTTP in front of a [`LedgerApi`].
//!
//! | Route | Body | Success |
//! |-------|------|---------|
//! | `POST /proposeTransaction` | `{content}` | 202 `{blockNum, txNumber}` |
//! | `GET /getTransaction` | `{blockNum, txNumber}` | 200 transaction, 204 if unsealed |
//! | `GET /getBlock` | `{blockNum}` | 200 block, 204 if unsealed |
//! | `GET /auditBlock` | `{blockNum}` | 200 `{blockNum, hash, consistent}`, 204 if unsealed |
//! | `GET /status` | none | 200 ledger status |
//! | `GET /helloWorld` | none | 200 liveness text |
//!
//! The GET routes read a JSON request body. Malformed bodies are rejected
//! with 400 before reaching the ledger.
//!
//! [`LedgerApi`]: tl_05_ledger_service::LedgerApi

pub mod error;
mod handlers;
mod service;

pub use error::ApiError;
pub use handlers::{AuditResponse, GetBlockRequest};
pub use service::{build_router, serve};
