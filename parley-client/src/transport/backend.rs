use crate::error::ClientError;
use crate::transport::TransportEvents;
use async_trait::async_trait;
use parley_core::{PathCandidate, SessionDescription};
use std::sync::Arc;

/// The local negotiation object: one peer connection plus its `chat` data
/// channel.
///
/// Every method is awaited by the session one at a time; implementations
/// never see two description operations overlap.
#[async_trait]
pub trait NegotiationBackend: Send + Sync {
    /// Creates the ordered `chat` data channel, then produces and applies a
    /// local offer.
    async fn create_offer(&self) -> Result<SessionDescription, ClientError>;

    /// Applies a remote offer, then produces and applies the answer.
    async fn accept_offer(&self, offer: SessionDescription)
    -> Result<SessionDescription, ClientError>;

    async fn accept_answer(&self, answer: SessionDescription) -> Result<(), ClientError>;

    async fn add_candidate(&self, candidate: PathCandidate) -> Result<(), ClientError>;

    /// Writes one text frame to the open data channel.
    async fn send(&self, text: String) -> Result<(), ClientError>;

    async fn close_transport(&self) -> Result<(), ClientError>;

    async fn close(&self) -> Result<(), ClientError>;
}

/// Builds a backend for a new session. Construction may be slow; the session
/// runs it concurrently with the rendezvous handshake.
#[async_trait]
pub trait BackendFactory: Send + Sync {
    async fn build(&self, events: TransportEvents)
    -> Result<Arc<dyn NegotiationBackend>, ClientError>;
}
