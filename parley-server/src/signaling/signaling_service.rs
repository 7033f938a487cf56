use crate::error::RendezvousError;
use crate::room::{RegistryStatus, RendezvousCommand};
use crate::signaling::{ConnectionId, SignalingOutput};
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use parley_core::ServerSignal;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// Owns the outbound half of every rendezvous WebSocket and the command queue
/// into the rendezvous actor.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) rendezvous_tx: mpsc::Sender<RendezvousCommand>,
}

impl SignalingService {
    pub fn new(rendezvous_tx: mpsc::Sender<RendezvousCommand>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
            }),
            rendezvous_tx,
        }
    }

    pub fn add_connection(&self, connection: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(connection, tx);
    }

    pub fn remove_connection(&self, connection: &ConnectionId) {
        self.inner.connections.remove(connection);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    /// Room count and time, answered by the rendezvous actor.
    pub async fn status(&self) -> Result<RegistryStatus, RendezvousError> {
        let (reply, rx) = oneshot::channel();
        self.rendezvous_tx
            .send(RendezvousCommand::Status { reply })
            .await
            .map_err(|_| RendezvousError::ServiceUnavailable)?;
        rx.await.map_err(|_| RendezvousError::ServiceUnavailable)
    }

    fn send_json(&self, connection: ConnectionId, signal: &ServerSignal) {
        let Some(peer) = self.inner.connections.get(&connection) else {
            warn!(
                "Attempted to send {:?} to disconnected connection {}",
                signal, connection
            );
            return;
        };

        match serde_json::to_string(signal) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", connection, e);
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_signal(&self, connection: ConnectionId, signal: ServerSignal) {
        self.send_json(connection, &signal);
    }
}
