use crate::engine::{Engine, EngineCommand, EngineConfig, SessionEvent, SessionState};
use crate::error::ClientError;
use crate::rendezvous::{RendezvousConnector, WsConnector};
use crate::transport::{BackendFactory, WebRtcBackendFactory};
use parley_core::{ChatMessage, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Handle to one participant's session engine.
///
/// Cloning is cheap; the engine stops once every handle is dropped.
#[derive(Clone)]
pub struct ChatSession {
    commands: mpsc::UnboundedSender<EngineCommand>,
    state: watch::Receiver<SessionState>,
}

impl ChatSession {
    /// WebSocket rendezvous and WebRTC transport, as configured.
    pub fn connect(config: EngineConfig) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let connector = Arc::new(WsConnector::new(config.signaling_url.clone()));
        let factory = Arc::new(WebRtcBackendFactory::new(config.transport.clone()));
        Self::spawn(config, connector, factory)
    }

    pub fn spawn(
        config: EngineConfig,
        connector: Arc<dyn RendezvousConnector>,
        factory: Arc<dyn BackendFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let engine = Engine::new(config, connector, factory, cmd_rx, state_tx, event_tx);
        tokio::spawn(engine.run());

        (
            Self {
                commands: cmd_tx,
                state: state_rx,
            },
            event_rx,
        )
    }

    /// Joins a freshly generated room code and returns it for sharing.
    pub fn create_room(&self) -> Result<RoomId, ClientError> {
        let room_id = RoomId::generate();
        self.join_room(room_id.clone())?;
        Ok(room_id)
    }

    pub fn join_room(&self, room_id: RoomId) -> Result<(), ClientError> {
        self.command(EngineCommand::Join { room_id })
    }

    /// Sends one text message. Fails with [`ClientError::NotConnected`],
    /// leaving the message list untouched, unless the session is connected.
    pub async fn send(&self, text: impl Into<String>) -> Result<ChatMessage, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.command(EngineCommand::Send {
            text: text.into(),
            reply,
        })?;
        rx.await.map_err(|_| ClientError::SessionClosed)?
    }

    /// Tears the session down and waits until it is gone.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        let (done, rx) = oneshot::channel();
        self.command(EngineCommand::Disconnect { done })?;
        rx.await.map_err(|_| ClientError::SessionClosed)
    }

    pub async fn messages(&self) -> Result<Vec<ChatMessage>, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.command(EngineCommand::Messages { reply })?;
        rx.await.map_err(|_| ClientError::SessionClosed)
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Resolves once the session reaches `target`.
    pub async fn wait_for_state(&self, target: SessionState) -> Result<(), ClientError> {
        let mut state = self.state.clone();
        state
            .wait_for(|s| *s == target)
            .await
            .map(|_| ())
            .map_err(|_| ClientError::SessionClosed)
    }

    fn command(&self, cmd: EngineCommand) -> Result<(), ClientError> {
        self.commands
            .send(cmd)
            .map_err(|_| ClientError::SessionClosed)
    }
}
