//! TL-Evaluate: drive two ledger replicas concurrently and audit the result.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use ledger_types::Block;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tl_evaluate::client::LedgerClient;
use tl_evaluate::verify::{compare_replicas, verify_chain, Accepted};

/// TL-Evaluate: concurrent proposals against two replicas, then a chain audit
#[derive(Parser, Debug)]
#[command(name = "tl-evaluate")]
#[command(about = "Propose transactions through two replicas and verify the resulting chain")]
struct Args {
    /// First replica endpoint (`host:port`)
    #[arg(long, default_value = "localhost:9090")]
    replica_a: String,

    /// Second replica endpoint (`host:port`)
    #[arg(long, default_value = "localhost:9091")]
    replica_b: String,

    /// Total number of proposals, split evenly between the replicas
    #[arg(short = 'n', long, default_value = "1000")]
    proposals: usize,

    /// Proposals in flight at once
    #[arg(short, long, default_value = "16")]
    concurrency: usize,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let timeout = Duration::from_millis(args.timeout_ms);
    let replicas = [
        LedgerClient::new(&args.replica_a, timeout)?,
        LedgerClient::new(&args.replica_b, timeout)?,
    ];

    // Tag this run so earlier runs against the same store do not count as duplicates.
    let run = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f").to_string();
    info!(
        "Proposing {} transactions through {} and {} (run {})",
        args.proposals, args.replica_a, args.replica_b, run
    );

    let results: Vec<_> = stream::iter(0..args.proposals)
        .map(|i| {
            let client = replicas[i % 2].clone();
            let content = format!("{} {}: {}", run, client.endpoint(), i);
            async move {
                let outcome = client.propose(content.clone()).await;
                (content, outcome)
            }
        })
        .buffer_unordered(args.concurrency.max(1))
        .collect()
        .await;

    let mut accepted = Vec::with_capacity(results.len());
    let mut rejected = 0usize;
    for (content, outcome) in results {
        match outcome {
            Ok(position) => accepted.push(Accepted { content, position }),
            Err(e) => {
                rejected += 1;
                warn!("Proposal {:?} failed: {}", content, e);
            }
        }
    }
    info!("{} proposals accepted, {} failed", accepted.len(), rejected);

    let chain_a = download_chain(&replicas[0]).await?;
    let chain_b = download_chain(&replicas[1]).await?;
    info!(
        "{} sealed blocks via {}, {} via {}",
        chain_a.len(),
        args.replica_a,
        chain_b.len(),
        args.replica_b
    );

    let longest = if chain_a.len() >= chain_b.len() { &chain_a } else { &chain_b };
    let mut report = verify_chain(longest, &accepted);
    report.findings.extend(compare_replicas(&chain_a, &chain_b));

    info!(
        "{} blocks, {} transactions; {} accepted proposals confirmed, {} in unsealed blocks",
        report.blocks, report.transactions, report.confirmed, report.pending
    );
    if !report.is_consistent() {
        for finding in &report.findings {
            warn!("{}", finding);
        }
        bail!("ledger verification failed with {} findings", report.findings.len());
    }
    info!("Ledger verified");
    Ok(())
}

/// Fetch blocks from 0 until the replica reports one as not sealed.
async fn download_chain(client: &LedgerClient) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    while let Some(block) = client.get_block(blocks.len() as u64).await? {
        blocks.push(block);
    }
    Ok(blocks)
}
