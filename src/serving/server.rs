//! Server lifecycle: bind, serve, shut down gracefully.

use std::net::SocketAddr;

use crate::core::errors::ClassifyResult;
use crate::core::inference::ScoreModel;
use crate::serving::router::{router, AppState};

/// Binds the listener and serves the classification API until a shutdown
/// signal arrives.
pub async fn serve<M: ScoreModel + 'static>(
    addr: SocketAddr,
    state: AppState<M>,
) -> ClassifyResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "classification server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
