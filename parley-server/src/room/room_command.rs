use crate::room::RegistryStatus;
use crate::signaling::ConnectionId;
use parley_core::{ClientSignal, ParticipantId, PathCandidate, RoomId, ServerSignal, SessionDescription};
use tokio::sync::oneshot;

/// Negotiation material forwarded verbatim to the other member of a room.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayPayload {
    Offer { description: SessionDescription },
    Answer { description: SessionDescription },
    Candidate { candidate: Option<PathCandidate> },
    Ready,
}

impl RelayPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            RelayPayload::Offer { .. } => "session-offer",
            RelayPayload::Answer { .. } => "session-answer",
            RelayPayload::Candidate { .. } => "path-candidate",
            RelayPayload::Ready => "peer-ready",
        }
    }

    /// The signal the receiving member sees, stamped with the sender's id.
    pub fn into_signal(self, room_id: RoomId, from: ParticipantId) -> ServerSignal {
        match self {
            RelayPayload::Offer { description } => ServerSignal::SessionOffer {
                room_id,
                from_peer_id: from,
                description,
            },
            RelayPayload::Answer { description } => ServerSignal::SessionAnswer {
                room_id,
                from_peer_id: from,
                description,
            },
            RelayPayload::Candidate { candidate } => ServerSignal::PathCandidate {
                room_id,
                from_peer_id: from,
                candidate,
            },
            RelayPayload::Ready => ServerSignal::PeerReady { peer_id: from },
        }
    }
}

/// Commands processed by the rendezvous actor, one at a time.
#[derive(Debug)]
pub enum RendezvousCommand {
    Join {
        connection: ConnectionId,
        room_id: RoomId,
        participant_id: ParticipantId,
    },

    Relay {
        connection: ConnectionId,
        room_id: RoomId,
        payload: RelayPayload,
    },

    ListRooms { connection: ConnectionId },

    /// The WebSocket behind `connection` is gone.
    Disconnect { connection: ConnectionId },

    Status { reply: oneshot::Sender<RegistryStatus> },
}

impl RendezvousCommand {
    pub fn from_signal(connection: ConnectionId, signal: ClientSignal) -> Self {
        match signal {
            ClientSignal::JoinRoom {
                room_id,
                participant_id,
            } => RendezvousCommand::Join {
                connection,
                room_id,
                participant_id,
            },
            // Rooms hold two members, so the target is always "the other one".
            ClientSignal::SessionOffer {
                room_id,
                description,
                ..
            } => RendezvousCommand::Relay {
                connection,
                room_id,
                payload: RelayPayload::Offer { description },
            },
            ClientSignal::SessionAnswer {
                room_id,
                description,
                ..
            } => RendezvousCommand::Relay {
                connection,
                room_id,
                payload: RelayPayload::Answer { description },
            },
            ClientSignal::PathCandidate { room_id, candidate } => RendezvousCommand::Relay {
                connection,
                room_id,
                payload: RelayPayload::Candidate { candidate },
            },
            ClientSignal::PeerReady { room_id } => RendezvousCommand::Relay {
                connection,
                room_id,
                payload: RelayPayload::Ready,
            },
            ClientSignal::ListRooms => RendezvousCommand::ListRooms { connection },
        }
    }
}
