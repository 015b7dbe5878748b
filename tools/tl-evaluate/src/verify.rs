//! Offline checks over a chain downloaded from one or more replicas.

use std::collections::HashMap;

use ledger_types::{Block, IntegrityViolation, TxPosition};
use thiserror::Error;

/// A proposal the ledger acknowledged with a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub content: String,
    pub position: TxPosition,
}

/// One problem found in a downloaded chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Finding {
    #[error("expected block {expected}, got block {found}")]
    OutOfSequence { expected: u64, found: u64 },

    #[error(transparent)]
    Integrity(#[from] IntegrityViolation),

    #[error("content {content:?} appears {count} times in the chain")]
    Duplicate { content: String, count: usize },

    #[error("{content:?} was accepted at block {} tx {} but the chain holds {found:?} there", .position.block_num, .position.tx_number)]
    Misplaced {
        content: String,
        position: TxPosition,
        found: Option<String>,
    },

    #[error("replicas disagree on block {block_num}: {left} vs {right}")]
    ReplicaMismatch {
        block_num: u64,
        left: String,
        right: String,
    },
}

/// Outcome of [`verify_chain`].
#[derive(Debug, Default)]
pub struct ChainReport {
    pub blocks: u64,
    pub transactions: u64,
    /// Accepted proposals found at their acknowledged position.
    pub confirmed: usize,
    /// Accepted proposals whose block is not sealed yet.
    pub pending: usize,
    pub findings: Vec<Finding>,
}

impl ChainReport {
    pub fn is_consistent(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Verify numbering, hashes and links of `blocks`, then locate every
/// accepted proposal.
pub fn verify_chain(blocks: &[Block], accepted: &[Accepted]) -> ChainReport {
    let mut report = ChainReport {
        blocks: blocks.len() as u64,
        ..ChainReport::default()
    };

    for (expected, block) in (0u64..).zip(blocks) {
        if block.block_num() != expected {
            report.findings.push(Finding::OutOfSequence {
                expected,
                found: block.block_num(),
            });
        }
        if let Err(violation) = block.verify_hash() {
            report.findings.push(violation.into());
        }
        if expected > 0 {
            if let Err(violation) = block.verify_link(&blocks[expected as usize - 1]) {
                report.findings.push(violation.into());
            }
        }
        report.transactions += block.transactions().len() as u64;
    }

    let mut occurrences: HashMap<&str, usize> =
        accepted.iter().map(|a| (a.content.as_str(), 0)).collect();
    for tx in blocks.iter().flat_map(|b| b.transactions()) {
        if let Some(count) = occurrences.get_mut(tx.content.as_str()) {
            *count += 1;
        }
    }
    let mut duplicates: Vec<_> = occurrences
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();
    duplicates.sort();
    report
        .findings
        .extend(duplicates.into_iter().map(|(content, count)| Finding::Duplicate {
            content: content.to_string(),
            count,
        }));

    for proposal in accepted {
        let Some(block) = blocks.get(proposal.position.block_num as usize) else {
            report.pending += 1;
            continue;
        };
        let found = block
            .transaction(proposal.position.tx_number)
            .map(|tx| tx.content.clone());
        if found.as_deref() == Some(proposal.content.as_str()) {
            report.confirmed += 1;
        } else {
            report.findings.push(Finding::Misplaced {
                content: proposal.content.clone(),
                position: proposal.position,
                found,
            });
        }
    }

    report
}

/// Compare the common prefix of two replicas' chains block by block.
pub fn compare_replicas(left: &[Block], right: &[Block]) -> Vec<Finding> {
    left.iter()
        .zip(right)
        .filter(|(l, r)| l.hash() != r.hash())
        .map(|(l, r)| Finding::ReplicaMismatch {
            block_num: l.block_num(),
            left: l.hash().to_string(),
            right: r.hash().to_string(),
        })
        .collect()
}
