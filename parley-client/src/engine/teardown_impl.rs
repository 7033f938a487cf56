use crate::engine::{Engine, SessionEvent, SessionState};
use tracing::{info, warn};

impl Engine {
    /// Releases the current session: pending tasks, data transport,
    /// negotiation object, then the rendezvous connection.
    pub(super) async fn teardown(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        if let Some(step) = session.step.take() {
            step.abort();
        }
        if let Some(build) = session.build_task.take() {
            build.abort();
        }
        if let Some(connect) = session.connect_task.take() {
            connect.abort();
        }

        if let Some(backend) = session.backend.take() {
            if let Err(e) = backend.close_transport().await {
                warn!("Failed to close data channel: {}", e);
            }
            if let Err(e) = backend.close().await {
                warn!("Failed to close peer connection: {}", e);
            }
        }

        drop(session.rendezvous.take());
        info!(
            "Session of {} in room {} torn down",
            session.participant_id, session.room_id
        );
    }

    pub(super) async fn close_session(&mut self, state: SessionState) {
        self.teardown().await;
        self.set_state(state);
    }

    pub(super) async fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Session failed: {}", reason);

        self.teardown().await;
        self.set_state(SessionState::Failed);
        self.emit(SessionEvent::Failed { reason });
    }

    /// Explicit user disconnect: always ends in `Idle` with an empty log.
    pub(super) async fn disconnect(&mut self) {
        self.teardown().await;
        self.messages.clear();
        self.set_state(SessionState::Idle);
    }
}
