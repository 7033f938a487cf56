use crate::engine::{Engine, SessionEvent, SessionState};
use parley_core::ServerSignal;
use tracing::{debug, info, warn};

impl Engine {
    pub(super) async fn handle_signal(&mut self, signal: Option<ServerSignal>) {
        let Some(signal) = signal else {
            self.rendezvous_closed().await;
            return;
        };

        let Some(session) = self.session.as_mut() else {
            return;
        };

        match signal {
            ServerSignal::RoomJoined {
                room_id,
                participant_id,
                is_initiator,
                member_count,
            } => {
                info!(
                    "Joined room {} ({} member(s), initiator: {})",
                    room_id, member_count, is_initiator
                );
                session.is_initiator = is_initiator;
                self.emit(SessionEvent::Joined {
                    room_id,
                    participant_id,
                    is_initiator,
                    member_count,
                });
            }

            ServerSignal::RoomFull { room_id } => {
                self.emit(SessionEvent::RoomFull {
                    room_id: room_id.clone(),
                });
                self.fail(format!("room {room_id} is full")).await;
            }

            ServerSignal::PeerJoined { peer_id, .. } => {
                info!("Peer {} joined", peer_id);
                session.remote_peer = Some(peer_id.clone());
                if session.is_initiator {
                    session.negotiation.request_initiate();
                    if !session.negotiation.is_backend_ready() {
                        debug!("Negotiation object not ready yet, initiate deferred");
                    }
                }
                self.emit(SessionEvent::PeerJoined { peer_id });
                self.pump();
            }

            ServerSignal::SessionOffer {
                from_peer_id,
                description,
                ..
            } => {
                debug!("Offer from {}", from_peer_id);
                session.remote_peer = Some(from_peer_id);
                if session.negotiation.offer_received(description) {
                    warn!("Replacing an offer that was never applied");
                }
                self.pump();
            }

            ServerSignal::SessionAnswer {
                from_peer_id,
                description,
                ..
            } => {
                debug!("Answer from {}", from_peer_id);
                session.negotiation.answer_received(description);
                self.pump();
            }

            ServerSignal::PathCandidate { candidate, .. } => {
                let queued = candidate
                    .map(|candidate| session.negotiation.candidate_received(candidate))
                    .unwrap_or(false);
                if queued {
                    debug!(
                        "Remote candidate queued ({} pending)",
                        session.negotiation.pending_candidates()
                    );
                } else {
                    debug!("Remote end of candidates");
                }
                self.pump();
            }

            ServerSignal::PeerLeft { peer_id } => {
                info!("Peer {} left", peer_id);
                self.emit(SessionEvent::PeerLeft { peer_id });

                match self.state() {
                    SessionState::Connecting => {
                        self.fail("peer left before the transport opened").await;
                    }
                    SessionState::Connected => self.close_session(SessionState::Idle).await,
                    _ => {}
                }
            }

            ServerSignal::PeerReady { peer_id } => {
                debug!("Peer {} reports its transport ready", peer_id);
                self.emit(SessionEvent::PeerReady { peer_id });
            }

            ServerSignal::RoomsList { rooms } => {
                debug!("Ignoring rooms-list with {} room(s)", rooms.len());
            }
        }
    }

    /// The rendezvous connection dropped. Fatal only before the transport is
    /// up; an established data channel does not depend on it.
    async fn rendezvous_closed(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.rendezvous = None;
        }

        match self.state() {
            SessionState::Connecting => {
                self.fail("rendezvous connection closed during negotiation")
                    .await;
            }
            SessionState::Connected => {
                warn!("Rendezvous connection closed; data channel stays up");
            }
            _ => {}
        }
    }
}
