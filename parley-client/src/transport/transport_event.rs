use parley_core::PathCandidate;
use tokio::sync::mpsc;

/// Path-level connectivity as reported by the peer connection. Advisory only,
/// except for `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a backend reports back to the session that owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A local candidate to trickle to the peer. `None` ends gathering.
    LocalCandidate(Option<PathCandidate>),

    /// The `chat` data channel is open.
    ChannelOpen,

    ChannelMessage(String),

    ChannelClosed,

    ChannelError(String),

    PathState(PathState),
}

/// Sending half handed to a backend when it is built.
///
/// The session owns the receiving half and drops it on teardown, after
/// which every emit is silently discarded.
#[derive(Debug, Clone)]
pub struct TransportEvents {
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportEvents {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: TransportEvent) {
        let _ = self.tx.send(event);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
