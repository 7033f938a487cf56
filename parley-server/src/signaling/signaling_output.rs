use crate::signaling::ConnectionId;
use async_trait::async_trait;
use parley_core::ServerSignal;

/// Delivery of rendezvous messages to connected clients.
///
/// Delivery is best-effort: there is no acknowledgement and no retry, and a
/// message addressed to a connection that has already gone away is dropped.
/// Ordering per connection is whatever the underlying channel guarantees.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_signal(&self, connection: ConnectionId, signal: ServerSignal);
}
