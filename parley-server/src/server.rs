use crate::config::ServerConfig;
use crate::http::router;
use crate::room::{Rendezvous, RendezvousCommand};
use crate::signaling::SignalingService;
use anyhow::Context;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

/// Starts the rendezvous actor and returns the service that feeds it.
pub fn spawn_rendezvous(config: &ServerConfig) -> SignalingService {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RendezvousCommand>(config.command_buffer.max(1));
    let signaling = SignalingService::new(cmd_tx);

    let rendezvous = Rendezvous::new(cmd_rx, Arc::new(signaling.clone()), config.sweep_interval());
    tokio::spawn(rendezvous.run());

    signaling
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let service = spawn_rendezvous(&config);
    let app = router(service, &config);

    info!(
        "Rendezvous server listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("rendezvous server error")
}

/// Binds `config.bind_address` and serves until Ctrl+C.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;

    serve_on(listener, config, shutdown_signal()).await?;
    info!("Rendezvous server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down");
    } else {
        std::future::pending::<()>().await;
    }
}
