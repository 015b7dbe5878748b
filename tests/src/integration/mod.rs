//! # Integration Scenarios
//!
//! Every scenario runs against [`InMemoryCoordinationStore`], which offers the
//! same sorted reads and create-if-absent writes as the etcd adapter.
//!
//! [`InMemoryCoordinationStore`]: tl_01_coordination_store::InMemoryCoordinationStore

pub mod fixtures;

mod http;
mod replicas;
mod scenarios;
