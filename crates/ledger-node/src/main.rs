use anyhow::{Context, Result};
use ledger_node::{NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = NodeConfig::from_env().context("invalid configuration")?;
    info!("Listen address: {}", config.listen_addr);
    info!("Store: {:?} (timeout {:?})", config.store, config.store_timeout);
    info!(
        "Block size: {}, prefix: {}",
        config.ledger.block_size, config.ledger.key_prefix
    );

    let runtime = NodeRuntime::build(config).await?;
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
        }
    };
    let served = runtime.run(shutdown).await;

    runtime.teardown();
    served
}
