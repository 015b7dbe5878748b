//! Node lifecycle: wiring, serving and teardown.

use crate::config::{NodeConfig, StoreBackend};
use crate::dump;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tl_01_coordination_store::{CoordinationStore, InMemoryCoordinationStore, TimeoutStore};
use tl_05_ledger_service::LedgerService;
use tokio::net::TcpListener;
use tracing::{error, info};

/// One running ledger replica.
pub struct NodeRuntime {
    config: NodeConfig,
    service: Arc<LedgerService>,
}

impl NodeRuntime {
    /// Connect the store and build the service. The cache is not warmed yet.
    pub async fn build(config: NodeConfig) -> Result<Self> {
        let store = connect_store(&config).await?;
        let service = LedgerService::new(store, config.ledger.clone())
            .context("invalid ledger configuration")?;
        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }

    /// Use an already-constructed store, e.g. one shared between replicas in
    /// a single process.
    pub fn with_store(config: NodeConfig, store: Arc<dyn CoordinationStore>) -> Result<Self> {
        let store: Arc<dyn CoordinationStore> =
            Arc::new(TimeoutStore::new(store, config.store_timeout));
        let service = LedgerService::new(store, config.ledger.clone())
            .context("invalid ledger configuration")?;
        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> Arc<LedgerService> {
        Arc::clone(&self.service)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Warm the cache, then serve until `shutdown` resolves.
    pub async fn run(&self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        info!("===========================================");
        info!("  Tangle Ledger Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.service
            .initialize()
            .await
            .context("failed to populate block cache")?;

        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", self.config.listen_addr))?;
        tl_06_api_gateway::serve(listener, self.service.clone(), shutdown)
            .await
            .context("HTTP server failed")?;
        Ok(())
    }

    /// Dump the cache if a dump directory is configured.
    pub fn teardown(&self) {
        let Some(dir) = &self.config.dump_dir else {
            info!("Tearing down. Goodbye!");
            return;
        };
        let snapshot = self.service.snapshot();
        match dump::write_snapshot(dir, &self.config.listen_addr, &snapshot) {
            Ok(path) => info!("Wrote {} cached blocks to {}", snapshot.len(), path.display()),
            Err(e) => error!("Failed to dump block cache into {}: {}", dir.display(), e),
        }
        info!("Tearing down. Goodbye!");
    }
}

async fn connect_store(config: &NodeConfig) -> Result<Arc<dyn CoordinationStore>> {
    match &config.store {
        StoreBackend::Memory => {
            info!("Using in-memory coordination store (single replica only)");
            let store = InMemoryCoordinationStore::new();
            Ok(Arc::new(TimeoutStore::new(store, config.store_timeout)))
        }
        #[cfg(feature = "etcd")]
        StoreBackend::Etcd { endpoints } => {
            let store = tl_01_coordination_store::EtcdCoordinationStore::connect(
                endpoints,
                config.store_timeout,
            )
            .await
            .with_context(|| format!("failed to connect to etcd at {}", endpoints.join(",")))?;
            Ok(Arc::new(TimeoutStore::new(store, config.store_timeout)))
        }
        #[cfg(not(feature = "etcd"))]
        StoreBackend::Etcd { .. } => {
            anyhow::bail!("TL_STORE=etcd requires building ledger-node with the `etcd` feature")
        }
    }
}
