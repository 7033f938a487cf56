use crate::error::ClientError;
use crate::rendezvous::{RendezvousChannel, RendezvousConnector};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parley_core::{ClientSignal, RoomSummary, ServerSignal};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Rendezvous over `ws://host/ws`, JSON text frames.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn sender_task(
        mut write: SplitSink<WsStream, Message>,
        mut rx: mpsc::UnboundedReceiver<ClientSignal>,
    ) {
        while let Some(signal) = rx.recv().await {
            let json = match serde_json::to_string(&signal) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize {}: {}", signal.kind(), e);
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Text(json)).await {
                error!("Failed to send rendezvous message: {}", e);
                break;
            }
        }

        let _ = write.close().await;
        debug!("Rendezvous sender task terminated");
    }

    async fn receiver_task(mut read: SplitStream<WsStream>, tx: mpsc::UnboundedSender<ServerSignal>) {
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerSignal>(&text) {
                    Ok(signal) => {
                        if tx.send(signal).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring invalid rendezvous message: {}", e),
                },
                Ok(Message::Close(_)) => {
                    info!("Rendezvous connection closed by server");
                    break;
                }
                Err(e) => {
                    error!("Rendezvous WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        debug!("Rendezvous receiver task terminated");
    }
}

#[async_trait]
impl RendezvousConnector for WsConnector {
    async fn connect(&self) -> Result<RendezvousChannel, ClientError> {
        info!("Connecting to rendezvous service: {}", self.url);

        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        let (write, read) = ws_stream.split();

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        tokio::spawn(Self::sender_task(write, out_rx));
        tokio::spawn(Self::receiver_task(read, in_tx));

        Ok(RendezvousChannel {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}

/// One-shot `list-rooms` query.
pub async fn list_rooms(
    connector: &dyn RendezvousConnector,
    timeout: Duration,
) -> Result<Vec<RoomSummary>, ClientError> {
    let mut channel = connector.connect().await?;
    channel.send(ClientSignal::ListRooms)?;

    let wait = async {
        while let Some(signal) = channel.inbound.recv().await {
            if let ServerSignal::RoomsList { rooms } = signal {
                return Ok(rooms);
            }
        }
        Err(ClientError::Rendezvous(
            "connection closed before rooms-list".to_string(),
        ))
    };

    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| ClientError::Rendezvous("timed out waiting for rooms-list".to_string()))?
}
