//! # Tangle Ledger Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | ledger-types | canonical block hash |
//! | tl-02 Sequencer | uncontended commit against the in-memory store |
//! | tl-05 Ledger Service | cached `get_block` |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ledger_types::hashing::compute_block_hash;
use ledger_types::{ProposedTransaction, Transaction, TxPosition};
use tl_05_ledger_service::LedgerApi;
use tl_tests::integration::fixtures::{propose_all, Cluster};
use tokio::runtime::Runtime;

fn transactions(count: u64, content_len: usize) -> Vec<Transaction> {
    (0..count)
        .map(|tx_number| {
            Transaction::new(
                ProposedTransaction::new("x".repeat(content_len)),
                TxPosition {
                    block_num: 7,
                    tx_number,
                },
                "2024-01-01T00:00:00.000Z".to_string(),
            )
        })
        .collect()
}

fn bench_block_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger-types-block-hash");
    for size in [1u64, 25, 250] {
        let txs = transactions(size, 256);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("compute_block_hash", size), &txs, |b, txs| {
            b.iter(|| {
                black_box(compute_block_hash(
                    7,
                    "2024-01-01T00:00:00.000Z",
                    "ab",
                    black_box(txs),
                ))
            })
        });
    }
    group.finish();
}

fn bench_sequencer(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("tl-02-sequencer");

    group.bench_function("propose_uncontended", |b| {
        let cluster = Cluster::new(25);
        let ledger = cluster.replica();
        b.iter(|| {
            runtime.block_on(async {
                black_box(
                    ledger
                        .propose_transaction(ProposedTransaction::new("bench"))
                        .await
                        .expect("commit"),
                )
            })
        })
    });
    group.finish();
}

fn bench_cached_reads(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let cluster = Cluster::new(25);
    let ledger = cluster.replica();
    runtime.block_on(async {
        propose_all(ledger.as_ref(), (0..25 * 40).map(|i| format!("tx-{}", i))).await;
        ledger.initialize().await.expect("warm cache");
    });

    let mut group = c.benchmark_group("tl-05-ledger-service");
    group.bench_function("get_block_cached", |b| {
        let mut block_num = 0u64;
        b.iter(|| {
            block_num = (block_num + 1) % 40;
            runtime.block_on(async {
                black_box(ledger.get_block(block_num).await.expect("read"))
            })
        })
    });
    group.finish();
}

criterion_group!(benches, bench_block_hash, bench_sequencer, bench_cached_reads);
criterion_main!(benches);
