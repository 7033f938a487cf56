mod test_ws_signaling_round_trip;

use parley_server::{ServerConfig, serve_on};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A live server on an ephemeral port. Dropping the sender stops it.
pub async fn spawn_test_server() -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.await;
        };
        serve_on(listener, ServerConfig::default(), shutdown)
            .await
            .expect("server failed");
    });

    (addr, shutdown_tx)
}
