use crate::engine::negotiation::NegotiationSession;
use crate::engine::{ActiveSession, BackendResult, ConnectResult, Engine, SessionState};
use crate::error::ClientError;
use crate::transport::TransportEvents;
use parley_core::{ClientSignal, ParticipantId, RoomId};
use tokio::sync::oneshot;
use tracing::info;

impl Engine {
    /// Opens a fresh session for `room_id`, replacing any current one.
    ///
    /// The negotiation object and the rendezvous connection are both opened
    /// on their own tasks; each completion arrives later as an input, so a
    /// disconnect is never stuck behind either.
    pub(super) async fn start_session(&mut self, room_id: RoomId) {
        if self.session.is_some() {
            info!("Leaving current session before joining {}", room_id);
            self.teardown().await;
        }
        self.messages.clear();

        let participant_id = ParticipantId::generate();
        let (events, transport_rx) = TransportEvents::channel();
        let (ready_tx, ready_rx) = oneshot::channel::<BackendResult>();

        let factory = self.factory.clone();
        let build_task = tokio::spawn(async move {
            let _ = ready_tx.send(factory.build(events).await);
        });

        let connector = self.connector.clone();
        let connect_timeout = self.config.connect_timeout;
        let (connected_tx, connected_rx) = oneshot::channel::<ConnectResult>();
        let connect_task = tokio::spawn(async move {
            let result = match tokio::time::timeout(connect_timeout, connector.connect()).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Rendezvous(
                    "timed out connecting to the rendezvous service".to_string(),
                )),
            };
            let _ = connected_tx.send(result);
        });

        self.session = Some(ActiveSession {
            room_id: room_id.clone(),
            participant_id: participant_id.clone(),
            is_initiator: false,
            remote_peer: None,
            negotiation: NegotiationSession::new(),
            rendezvous: None,
            connect_task: Some(connect_task),
            connect_rx: Some(connected_rx),
            backend: None,
            build_task: Some(build_task),
            ready_rx: Some(ready_rx),
            ready_deadline: Some(Box::pin(tokio::time::sleep(self.config.ready_timeout))),
            transport_rx,
            step: None,
        });
        self.set_state(SessionState::Connecting);

        info!("Joining room {} as {}", room_id, participant_id);
    }

    /// The rendezvous connection is up (or could not be opened): announce
    /// the join.
    pub(super) async fn handle_connected(&mut self, result: ConnectResult) {
        let channel = match result {
            Ok(channel) => channel,
            Err(e) => {
                self.fail(format!("rendezvous connection failed: {e}")).await;
                return;
            }
        };

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.connect_task = None;
        session.rendezvous = Some(channel);
        session.signal(ClientSignal::JoinRoom {
            room_id: session.room_id.clone(),
            participant_id: session.participant_id.clone(),
        });
    }

    pub(super) async fn handle_ready(&mut self, result: BackendResult) {
        let backend = match result {
            Ok(backend) => backend,
            Err(e) => {
                self.fail(format!("failed to build negotiation object: {e}"))
                    .await;
                return;
            }
        };

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.backend = Some(backend);
        session.build_task = None;
        session.ready_deadline = None;
        session.negotiation.backend_ready();
        info!("Negotiation object ready");

        self.pump();
    }
}
