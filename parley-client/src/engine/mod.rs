use crate::error::ClientError;
use crate::messages::MessageLog;
use crate::rendezvous::{RendezvousChannel, RendezvousConnector};
use crate::transport::{BackendFactory, NegotiationBackend, TransportConfig, TransportEvent};
use parley_core::{ChatMessage, ClientSignal, ParticipantId, RoomId, ServerSignal};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Sleep;
use tracing::{info, warn};

mod chat_session;
mod drive_negotiation_impl;
mod handle_signal_impl;
mod negotiation;
mod session_setup_impl;
mod teardown_impl;
mod transport_event_impl;

pub use chat_session::*;
use negotiation::{NegotiationSession, StepOutcome};

pub const DEFAULT_SIGNALING_URL: &str = "ws://localhost:3001/ws";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub signaling_url: String,
    pub transport: TransportConfig,
    /// Upper bound on opening the rendezvous connection.
    pub connect_timeout: Duration,
    /// Upper bound on waiting for the local negotiation object.
    pub ready_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_string(),
            transport: TransportConfig::default(),
            connect_timeout: Duration::from_secs(10),
            ready_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the front end gets to see.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    Joined {
        room_id: RoomId,
        participant_id: ParticipantId,
        is_initiator: bool,
        member_count: usize,
    },
    RoomFull {
        room_id: RoomId,
    },
    PeerJoined {
        peer_id: ParticipantId,
    },
    PeerLeft {
        peer_id: ParticipantId,
    },
    PeerReady {
        peer_id: ParticipantId,
    },
    MessageReceived(ChatMessage),
    Failed {
        reason: String,
    },
}

#[derive(Debug)]
pub(crate) enum EngineCommand {
    Join {
        room_id: RoomId,
    },
    Send {
        text: String,
        reply: oneshot::Sender<Result<ChatMessage, ClientError>>,
    },
    Disconnect {
        done: oneshot::Sender<()>,
    },
    Messages {
        reply: oneshot::Sender<Vec<ChatMessage>>,
    },
}

type BackendResult = Result<Arc<dyn NegotiationBackend>, ClientError>;
type ConnectResult = Result<RendezvousChannel, ClientError>;

/// Everything owned by one create/join attempt. Dropping it releases every
/// queue and every event source that could still refer to the attempt.
struct ActiveSession {
    room_id: RoomId,
    participant_id: ParticipantId,
    is_initiator: bool,
    remote_peer: Option<ParticipantId>,
    negotiation: NegotiationSession,
    rendezvous: Option<RendezvousChannel>,
    connect_task: Option<JoinHandle<()>>,
    connect_rx: Option<oneshot::Receiver<ConnectResult>>,
    backend: Option<Arc<dyn NegotiationBackend>>,
    build_task: Option<JoinHandle<()>>,
    ready_rx: Option<oneshot::Receiver<BackendResult>>,
    ready_deadline: Option<Pin<Box<Sleep>>>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    step: Option<JoinHandle<Result<StepOutcome, ClientError>>>,
}

impl ActiveSession {
    fn signal(&self, signal: ClientSignal) {
        let Some(rendezvous) = &self.rendezvous else {
            warn!("No rendezvous connection, dropping {}", signal.kind());
            return;
        };
        if let Err(e) = rendezvous.send(signal) {
            warn!("Failed to send rendezvous message: {}", e);
        }
    }
}

enum Input {
    Command(EngineCommand),
    Signal(Option<ServerSignal>),
    Connected(ConnectResult),
    Ready(BackendResult),
    Transport(TransportEvent),
    StepDone(Result<Result<StepOutcome, ClientError>, JoinError>),
    ReadyTimeout,
}

/// Event loop of one participant. Owns the session, the message log and the
/// published state; every input is handled to completion before the next.
pub(crate) struct Engine {
    config: EngineConfig,
    connector: Arc<dyn RendezvousConnector>,
    factory: Arc<dyn BackendFactory>,
    commands: mpsc::UnboundedReceiver<EngineCommand>,
    state_tx: watch::Sender<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    messages: MessageLog,
    session: Option<ActiveSession>,
}

impl Engine {
    pub(crate) fn new(
        config: EngineConfig,
        connector: Arc<dyn RendezvousConnector>,
        factory: Arc<dyn BackendFactory>,
        commands: mpsc::UnboundedReceiver<EngineCommand>,
        state_tx: watch::Sender<SessionState>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            config,
            connector,
            factory,
            commands,
            state_tx,
            events,
            messages: MessageLog::new(),
            session: None,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Session engine started");

        while let Some(input) = self.next_input().await {
            match input {
                Input::Command(cmd) => self.handle_command(cmd).await,
                Input::Signal(signal) => self.handle_signal(signal).await,
                Input::Connected(result) => self.handle_connected(result).await,
                Input::Ready(result) => self.handle_ready(result).await,
                Input::Transport(event) => self.handle_transport_event(event).await,
                Input::StepDone(result) => self.handle_step_done(result).await,
                Input::ReadyTimeout => {
                    let reason = format!(
                        "negotiation object not ready within {:?}",
                        self.config.ready_timeout
                    );
                    self.fail(reason).await;
                }
            }
        }

        self.teardown().await;
        info!("Session engine finished");
    }

    async fn next_input(&mut self) -> Option<Input> {
        let Some(session) = self.session.as_mut() else {
            return self.commands.recv().await.map(Input::Command);
        };

        let ActiveSession {
            rendezvous,
            connect_rx,
            ready_rx,
            ready_deadline,
            transport_rx,
            step,
            ..
        } = session;

        tokio::select! {
            cmd = self.commands.recv() => cmd.map(Input::Command),

            signal = recv_signal(rendezvous) => Some(Input::Signal(signal)),

            connected = wait_connected(connect_rx) => Some(Input::Connected(connected)),

            ready = wait_ready(ready_rx) => Some(Input::Ready(ready)),

            Some(event) = transport_rx.recv() => Some(Input::Transport(event)),

            done = wait_step(step) => Some(Input::StepDone(done)),

            _ = wait_deadline(ready_deadline) => Some(Input::ReadyTimeout),
        }
    }

    async fn handle_command(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Join { room_id } => self.start_session(room_id).await,

            EngineCommand::Send { text, reply } => {
                let result = self.send_text(text).await;
                let _ = reply.send(result);
            }

            EngineCommand::Disconnect { done } => {
                self.disconnect().await;
                let _ = done.send(());
            }

            EngineCommand::Messages { reply } => {
                let _ = reply.send(self.messages.messages().to_vec());
            }
        }
    }

    async fn send_text(&mut self, text: String) -> Result<ChatMessage, ClientError> {
        if self.state() != SessionState::Connected {
            return Err(ClientError::NotConnected);
        }
        let backend = self
            .session
            .as_ref()
            .and_then(|s| s.backend.clone())
            .ok_or(ClientError::NotConnected)?;

        let message = ChatMessage::local(text);
        backend.send(message.to_frame().encode()?).await?;
        self.messages.push_local(message.clone());
        Ok(message)
    }

    fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: SessionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            info!("Session state: {} -> {}", previous, state);
            self.emit(SessionEvent::StateChanged(state));
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

async fn recv_signal(rendezvous: &mut Option<RendezvousChannel>) -> Option<ServerSignal> {
    match rendezvous {
        Some(channel) => channel.inbound.recv().await,
        None => std::future::pending().await,
    }
}

async fn wait_connected(
    connect_rx: &mut Option<oneshot::Receiver<ConnectResult>>,
) -> ConnectResult {
    let Some(rx) = connect_rx else {
        return std::future::pending().await;
    };
    let result = rx.await;
    *connect_rx = None;
    result.unwrap_or_else(|_| {
        Err(ClientError::Rendezvous(
            "rendezvous connect was aborted".to_string(),
        ))
    })
}

async fn wait_ready(ready_rx: &mut Option<oneshot::Receiver<BackendResult>>) -> BackendResult {
    let Some(rx) = ready_rx else {
        return std::future::pending().await;
    };
    let result = rx.await;
    *ready_rx = None;
    result.unwrap_or_else(|_| {
        Err(ClientError::Negotiation(
            "negotiation object construction was aborted".to_string(),
        ))
    })
}

async fn wait_step(
    step: &mut Option<JoinHandle<Result<StepOutcome, ClientError>>>,
) -> Result<Result<StepOutcome, ClientError>, JoinError> {
    let Some(handle) = step else {
        return std::future::pending().await;
    };
    let result = handle.await;
    *step = None;
    result
}

async fn wait_deadline(deadline: &mut Option<Pin<Box<Sleep>>>) {
    match deadline {
        Some(sleep) => {
            sleep.as_mut().await;
            *deadline = None;
        }
        None => std::future::pending().await,
    }
}
