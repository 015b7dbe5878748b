//! Ports for the ledger service

pub mod inbound;
