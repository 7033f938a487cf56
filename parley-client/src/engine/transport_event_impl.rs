use crate::engine::{Engine, SessionEvent, SessionState};
use crate::transport::{PathState, TransportEvent};
use parley_core::ClientSignal;
use tracing::{debug, info};

impl Engine {
    pub(super) async fn handle_transport_event(&mut self, event: TransportEvent) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        match event {
            TransportEvent::LocalCandidate(candidate) => {
                session.signal(ClientSignal::PathCandidate {
                    room_id: session.room_id.clone(),
                    candidate,
                });
            }

            TransportEvent::ChannelOpen => {
                if self.state() != SessionState::Connecting {
                    return;
                }
                info!("Data channel open, session connected");
                session.signal(ClientSignal::PeerReady {
                    room_id: session.room_id.clone(),
                });
                self.set_state(SessionState::Connected);
            }

            TransportEvent::ChannelMessage(text) => {
                if let Some(message) = self.messages.receive(&text) {
                    self.emit(SessionEvent::MessageReceived(message));
                }
            }

            TransportEvent::ChannelClosed => {
                info!("Data channel closed");
                self.close_session(SessionState::Idle).await;
            }

            TransportEvent::ChannelError(e) => {
                self.fail(format!("data channel error: {e}")).await;
            }

            TransportEvent::PathState(PathState::Failed) => {
                self.fail("network path failed").await;
            }

            // Advisory; the data channel decides.
            TransportEvent::PathState(state) => debug!("Path state: {:?}", state),
        }
    }
}
