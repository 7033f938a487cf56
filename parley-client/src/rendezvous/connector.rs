use crate::error::ClientError;
use async_trait::async_trait;
use parley_core::{ClientSignal, ServerSignal};
use tokio::sync::mpsc;

/// One open rendezvous connection, seen as a pair of queues.
///
/// Dropping `outbound` closes the underlying connection; `inbound` yields
/// `None` once the service side is gone.
#[derive(Debug)]
pub struct RendezvousChannel {
    pub outbound: mpsc::UnboundedSender<ClientSignal>,
    pub inbound: mpsc::UnboundedReceiver<ServerSignal>,
}

impl RendezvousChannel {
    pub fn send(&self, signal: ClientSignal) -> Result<(), ClientError> {
        self.outbound
            .send(signal)
            .map_err(|_| ClientError::Rendezvous("rendezvous connection closed".to_string()))
    }
}

#[async_trait]
pub trait RendezvousConnector: Send + Sync {
    async fn connect(&self) -> Result<RendezvousChannel, ClientError>;
}
