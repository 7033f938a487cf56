use parley_core::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session is not connected")]
    NotConnected,

    #[error("session task has stopped")]
    SessionClosed,

    #[error("rendezvous error: {0}")]
    Rendezvous(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("webrtc error: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}
