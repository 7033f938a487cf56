use crate::signaling::ConnectionId;
use parley_core::{ParticipantId, RoomId, RoomSummary};

/// A room never holds more than this many participants.
pub const ROOM_CAPACITY: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub participant_id: ParticipantId,
    pub connection: ConnectionId,
}

/// Membership of one room, in join order.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    members: Vec<Member>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::with_capacity(ROOM_CAPACITY),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.members
            .iter()
            .any(|m| &m.participant_id == participant_id)
    }

    pub(crate) fn add(&mut self, participant_id: ParticipantId, connection: ConnectionId) {
        debug_assert!(!self.is_full());
        self.members.push(Member {
            participant_id,
            connection,
        });
    }

    /// Points an existing member at a new connection, returning the old one.
    pub(crate) fn rebind(
        &mut self,
        participant_id: &ParticipantId,
        connection: ConnectionId,
    ) -> Option<ConnectionId> {
        self.members
            .iter_mut()
            .find(|m| &m.participant_id == participant_id)
            .map(|m| std::mem::replace(&mut m.connection, connection))
    }

    /// Removes the member only if it is still owned by `connection`.
    pub(crate) fn remove(&mut self, participant_id: &ParticipantId, connection: ConnectionId) -> bool {
        let before = self.members.len();
        self.members
            .retain(|m| !(&m.participant_id == participant_id && m.connection == connection));
        self.members.len() != before
    }

    pub fn connections_except(&self, participant_id: &ParticipantId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|m| &m.participant_id != participant_id)
            .map(|m| m.connection)
            .collect()
    }

    pub fn connections(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection).collect()
    }

    pub fn participants(&self) -> Vec<ParticipantId> {
        self.members
            .iter()
            .map(|m| m.participant_id.clone())
            .collect()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            member_count: self.members.len(),
            members: self.participants(),
        }
    }
}
