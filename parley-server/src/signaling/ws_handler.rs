use crate::room::RendezvousCommand;
use crate::signaling::{ConnectionId, SignalingService};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use parley_core::ClientSignal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let connection = ConnectionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, connection, service))
}

async fn handle_socket(socket: WebSocket, connection: ConnectionId, service: SignalingService) {
    info!("New rendezvous connection: {}", connection);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_connection(connection, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientSignal>(&text) {
                        Ok(signal) => {
                            debug!("{} from {}", signal.kind(), connection);
                            let cmd = RendezvousCommand::from_signal(connection, signal);
                            if let Err(e) = service.rendezvous_tx.send(cmd).await {
                                error!("Rendezvous died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Ignoring invalid message from {}: {}", connection, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_connection(&connection);
    let _ = service
        .rendezvous_tx
        .send(RendezvousCommand::Disconnect { connection })
        .await;
    info!("Rendezvous connection closed: {}", connection);
}
