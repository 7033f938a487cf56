use crate::model::participant::ParticipantId;
use crate::model::room::{RoomId, RoomSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionKind {
    Offer,
    Answer,
}

/// Session description as exchanged by browsers (`RTCSessionDescriptionInit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: DescriptionKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: DescriptionKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: DescriptionKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Network-path candidate (`RTCIceCandidateInit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl PathCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }

    /// An empty candidate line marks the end of gathering.
    pub fn is_end_of_candidates(&self) -> bool {
        self.candidate.trim().is_empty()
    }
}

/// Messages a client sends over the rendezvous channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientSignal {
    JoinRoom {
        room_id: RoomId,
        participant_id: ParticipantId,
    },
    SessionOffer {
        room_id: RoomId,
        #[serde(default)]
        target_peer_id: Option<ParticipantId>,
        description: SessionDescription,
    },
    SessionAnswer {
        room_id: RoomId,
        #[serde(default)]
        target_peer_id: Option<ParticipantId>,
        description: SessionDescription,
    },
    PathCandidate {
        room_id: RoomId,
        #[serde(default)]
        candidate: Option<PathCandidate>,
    },
    PeerReady {
        room_id: RoomId,
    },
    ListRooms,
}

impl ClientSignal {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::SessionOffer { .. } => "session-offer",
            Self::SessionAnswer { .. } => "session-answer",
            Self::PathCandidate { .. } => "path-candidate",
            Self::PeerReady { .. } => "peer-ready",
            Self::ListRooms => "list-rooms",
        }
    }
}

/// Messages the rendezvous service sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerSignal {
    RoomJoined {
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
        room_id: RoomId,
        is_initiator: bool,
    },
    PeerLeft {
        peer_id: ParticipantId,
    },
    SessionOffer {
        room_id: RoomId,
        from_peer_id: ParticipantId,
        description: SessionDescription,
    },
    SessionAnswer {
        room_id: RoomId,
        from_peer_id: ParticipantId,
        description: SessionDescription,
    },
    PathCandidate {
        room_id: RoomId,
        from_peer_id: ParticipantId,
        #[serde(default)]
        candidate: Option<PathCandidate>,
    },
    PeerReady {
        peer_id: ParticipantId,
    },
    RoomsList {
        rooms: Vec<RoomSummary>,
    },
}
