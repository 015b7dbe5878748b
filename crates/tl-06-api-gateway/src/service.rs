//! Router construction and serving

use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tl_05_ledger_service::LedgerApi;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the ledger router over `ledger`.
pub fn build_router(ledger: Arc<dyn LedgerApi>) -> Router {
    Router::new()
        .route("/proposeTransaction", post(handlers::propose_transaction))
        .route("/getTransaction", get(handlers::get_transaction))
        .route("/getBlock", get(handlers::get_block))
        .route("/auditBlock", get(handlers::audit_block))
        .route("/status", get(handlers::status))
        .route("/helloWorld", get(handlers::hello_world))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(ledger)
}

/// Serve `ledger` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    ledger: Arc<dyn LedgerApi>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("[tl-06] listening on http://{}", addr);
    }
    axum::serve(listener, build_router(ledger))
        .with_graceful_shutdown(shutdown)
        .await
}
