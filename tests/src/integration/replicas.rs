//! # Multi-Replica Scenarios
//!
//! Replicas share nothing but the store. Each holds its own cache, built
//! independently, and they must still agree on every sealed block.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{expected_positions, propose_all, Cluster};
    use ledger_types::{ProposedTransaction, TxPosition};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tl_05_ledger_service::{LedgerApi, LedgerService};

    async fn spawn_proposals(
        ledger: Arc<LedgerService>,
        tag: &'static str,
        count: usize,
    ) -> Vec<(String, TxPosition)> {
        let tasks: Vec<_> = (0..count)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move {
                    let content = format!("{}-{}", tag, i);
                    let position = ledger
                        .propose_transaction(ProposedTransaction::new(content.clone()))
                        .await
                        .unwrap();
                    (content, position)
                })
            })
            .collect();
        let mut results = Vec::with_capacity(count);
        for task in futures::future::join_all(tasks).await {
            results.push(task.unwrap());
        }
        results
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_replicas_never_collide() {
        let cluster = Cluster::new(25);
        let a = cluster.replica();
        let b = cluster.replica();

        let (from_a, from_b) = tokio::join!(
            spawn_proposals(Arc::clone(&a), "a", 120),
            spawn_proposals(Arc::clone(&b), "b", 130)
        );

        let mut positions: Vec<TxPosition> = from_a
            .iter()
            .chain(&from_b)
            .map(|(_, position)| *position)
            .collect();
        positions.sort();
        assert_eq!(positions, expected_positions(250, 25));
        assert_eq!(cluster.store.len(), 250);
        assert_eq!(cluster.store.stats().puts_applied, 250);

        // Each acknowledged position holds the content that was acknowledged.
        for (content, position) in from_a.iter().chain(&from_b) {
            let tx = b.get_transaction(*position).await.unwrap().unwrap();
            assert_eq!(&tx.content, content);
        }
    }

    #[tokio::test]
    async fn test_replicas_agree_on_every_block() {
        let cluster = Cluster::new(5);
        let a = cluster.replica();
        let b = cluster.replica();

        for round in 0..6 {
            let writer = if round % 2 == 0 { &a } else { &b };
            propose_all(writer.as_ref(), (0..5).map(|i| format!("r{}-{}", round, i))).await;
        }

        let mut seen = HashSet::new();
        for block_num in 0..6 {
            let left = a.get_block(block_num).await.unwrap().unwrap();
            let right = b.get_block(block_num).await.unwrap().unwrap();
            assert_eq!(left, right);
            assert!(seen.insert(left.hash().to_string()));
        }
    }

    #[tokio::test]
    async fn test_replica_sees_blocks_sealed_by_another() {
        let cluster = Cluster::new(3);
        let a = cluster.replica();
        let b = cluster.replica();

        propose_all(a.as_ref(), (0..2).map(|i| format!("x-{}", i))).await;
        assert!(b.get_block(0).await.unwrap().is_none());

        propose_all(b.as_ref(), std::iter::once("x-2".to_string())).await;
        let block = a.get_block(0).await.unwrap().unwrap();
        assert_eq!(block.transactions()[2].content, "x-2");
    }

    #[tokio::test]
    async fn test_restarted_replica_rebuilds_identical_chain() {
        let cluster = Cluster::new(4);
        let first_run = cluster.replica();
        propose_all(first_run.as_ref(), (0..20).map(|i| format!("p-{}", i))).await;
        propose_all(first_run.as_ref(), (20..22).map(|i| format!("p-{}", i))).await;
        for block_num in 0..5 {
            first_run.get_block(block_num).await.unwrap().unwrap();
        }

        let restarted = cluster.replica();
        assert_eq!(restarted.initialize().await.unwrap(), 5);

        let status = restarted.status().await.unwrap();
        assert_eq!(status.latest_committed_index, Some(21));
        assert_eq!(status.latest_cached_block, Some(4));
        assert_eq!(status.cached_blocks, 5);

        let before = first_run.snapshot();
        let after = restarted.snapshot();
        assert_eq!(before.len(), after.len());
        for (left, right) in before.iter().zip(&after) {
            assert_eq!(left.as_ref(), right.as_ref());
        }
    }
}
