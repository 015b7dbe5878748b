//! # Single-Replica Scenarios
//!
//! Sealing, chain linkage and the behavior of one replica when the store
//! under it is tampered with.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{expected_positions, propose_all, Cluster};
    use ledger_types::{ProposedTransaction, TxPosition};
    use std::sync::Arc;
    use tl_05_ledger_service::LedgerApi;

    fn contents(range: std::ops::Range<u64>) -> impl Iterator<Item = String> {
        range.map(|i| format!("tx-{}", i))
    }

    // =============================================================================
    // SEALING
    // =============================================================================

    #[tokio::test]
    async fn test_first_block_seals_at_block_size() {
        let cluster = Cluster::new(25);
        let ledger = cluster.replica();

        let positions = propose_all(ledger.as_ref(), contents(0..25)).await;
        assert_eq!(positions, expected_positions(25, 25));

        let block = ledger.get_block(0).await.unwrap().expect("block 0 is sealed");
        assert_eq!(block.previous_hash(), "");
        assert_eq!(block.transactions().len(), 25);
        for (i, tx) in block.transactions().iter().enumerate() {
            assert_eq!(tx.content, format!("tx-{}", i));
            assert_eq!(tx.tx_number, i as u64);
        }

        assert!(ledger.get_block(1).await.unwrap().is_none());

        propose_all(ledger.as_ref(), contents(25..26)).await;
        assert!(ledger.get_block(1).await.unwrap().is_none());
        let pending = TxPosition {
            block_num: 1,
            tx_number: 0,
        };
        assert!(ledger.get_transaction(pending).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_content_is_committed() {
        let cluster = Cluster::new(1);
        let ledger = cluster.replica();
        ledger
            .propose_transaction(ProposedTransaction::new(""))
            .await
            .unwrap();

        let tx = ledger
            .get_transaction(TxPosition {
                block_num: 0,
                tx_number: 0,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.content, "");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_proposals_fill_dense_positions() {
        let cluster = Cluster::new(10);
        let ledger = cluster.replica();

        let tasks: Vec<_> = (0..100)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move {
                    ledger
                        .propose_transaction(ProposedTransaction::new(format!("c-{}", i)))
                        .await
                        .unwrap()
                })
            })
            .collect();
        let mut positions = Vec::new();
        for task in futures::future::join_all(tasks).await {
            positions.push(task.unwrap());
        }
        positions.sort();
        assert_eq!(positions, expected_positions(100, 10));
        assert_eq!(cluster.store.len(), 100);
    }

    // =============================================================================
    // CHAIN PROPERTIES
    // =============================================================================

    #[tokio::test]
    async fn test_chain_links_every_block() {
        let cluster = Cluster::new(4);
        let ledger = cluster.replica();
        propose_all(ledger.as_ref(), contents(0..4 * 12)).await;

        let mut previous: Option<Arc<ledger_types::Block>> = None;
        for block_num in 0..12 {
            let block = ledger.get_block(block_num).await.unwrap().unwrap();
            block.verify_hash().unwrap();
            match &previous {
                Some(parent) => assert_eq!(block.previous_hash(), parent.hash()),
                None => assert_eq!(block.previous_hash(), ""),
            }
            let numbers: Vec<u64> = block.transactions().iter().map(|tx| tx.tx_number).collect();
            assert_eq!(numbers, vec![0, 1, 2, 3]);
            previous = Some(block);
        }
        assert!(ledger.get_block(12).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repeated_reads_are_identical() {
        let cluster = Cluster::new(3);
        let ledger = cluster.replica();
        propose_all(ledger.as_ref(), contents(0..9)).await;

        let first = serde_json::to_vec(ledger.get_block(2).await.unwrap().unwrap().as_ref()).unwrap();
        let second = serde_json::to_vec(ledger.get_block(2).await.unwrap().unwrap().as_ref()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cached_block_never_changes() {
        let cluster = Cluster::new(2);
        let ledger = cluster.replica();
        propose_all(ledger.as_ref(), contents(0..4)).await;
        let cached = ledger.get_block(0).await.unwrap().unwrap();

        cluster.rewrite_content(1, "forged");
        propose_all(ledger.as_ref(), contents(4..6)).await;
        ledger.get_block(2).await.unwrap().unwrap();

        let again = ledger.get_block(0).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&cached, &again));
        assert_eq!(again.transactions()[1].content, "tx-1");
    }

    // =============================================================================
    // CORRUPTION
    // =============================================================================

    #[tokio::test]
    async fn test_corrupt_value_fails_uncached_read() {
        let cluster = Cluster::new(25);
        let writer = cluster.replica();
        propose_all(writer.as_ref(), contents(0..25)).await;
        cluster.corrupt(5, b"{\"content\":".to_vec());

        let reader = cluster.replica();
        let err = reader.get_block(0).await.unwrap_err();
        assert!(err.is_integrity(), "{}", err);
        assert!(!err.is_client_error());

        let err = reader
            .get_transaction(TxPosition {
                block_num: 0,
                tx_number: 3,
            })
            .await
            .unwrap_err();
        assert!(err.is_integrity());
    }

    #[tokio::test]
    async fn test_cached_replica_keeps_serving_and_audit_detects() {
        let cluster = Cluster::new(25);
        let ledger = cluster.replica();
        propose_all(ledger.as_ref(), contents(0..25)).await;
        let cached = ledger.get_block(0).await.unwrap().unwrap();

        cluster.rewrite_content(5, "tx-5 rewritten");

        let served = ledger.get_block(0).await.unwrap().unwrap();
        assert_eq!(served.hash(), cached.hash());

        let err = ledger.audit_block(0).await.unwrap_err();
        let violation = err.integrity().expect("audit reports an integrity violation");
        assert_eq!(violation.block_num(), Some(0));
    }

    #[tokio::test]
    async fn test_missing_transaction_inside_sealed_range_is_a_gap() {
        let cluster = Cluster::new(5);
        let writer = cluster.replica();
        propose_all(writer.as_ref(), contents(0..10)).await;
        cluster
            .store
            .remove(&tl_01_coordination_store::KeySpace::default().key(2));

        let reader = cluster.replica();
        let err = reader.get_block(0).await.unwrap_err();
        assert!(err.is_integrity(), "{}", err);
    }
}
