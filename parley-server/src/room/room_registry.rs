use crate::error::RendezvousError;
use crate::room::room::Room;
use crate::signaling::{ConnectionBinding, ConnectionId};
use chrono::{DateTime, Utc};
use parley_core::{ParticipantId, RoomId, RoomSummary};
use std::collections::HashMap;
use tracing::{debug, info};

/// Result of an accepted join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
    pub is_initiator: bool,
    pub member_count: usize,
    /// Members that must be told `peer-joined`. Empty for a re-join.
    pub notify: Vec<ConnectionId>,
    /// Departure from the room this connection was bound to before, if any.
    pub previous: Option<LeaveOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
    /// Members that must be told `peer-left`.
    pub remaining: Vec<ConnectionId>,
    pub room_removed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTargets {
    pub from: ParticipantId,
    pub targets: Vec<ConnectionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStatus {
    pub rooms: usize,
    pub timestamp: DateTime<Utc>,
}

/// Room table of the rendezvous service.
///
/// Only the rendezvous actor touches it, so every operation is a plain O(1)
/// map update with no locking and no I/O.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    bindings: HashMap<ConnectionId, ConnectionBinding>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `participant_id` in `room_id`, creating the room if needed.
    ///
    /// A full room is rejected with [`RendezvousError::RoomFull`] before
    /// anything is mutated, including the connection's previous binding.
    pub fn join(
        &mut self,
        connection: ConnectionId,
        room_id: RoomId,
        participant_id: ParticipantId,
    ) -> Result<JoinOutcome, RendezvousError> {
        let existing = self.rooms.get(&room_id);
        let rejoin = existing.is_some_and(|room| room.contains(&participant_id));
        if !rejoin && existing.is_some_and(Room::is_full) {
            return Err(RendezvousError::RoomFull { room_id });
        }

        let same_binding = self
            .bindings
            .get(&connection)
            .is_some_and(|b| b.room_id == room_id && b.participant_id == participant_id);
        let previous = if same_binding {
            None
        } else {
            self.leave(connection)
        };

        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone()));

        let notify = if rejoin {
            if let Some(stale) = room
                .rebind(&participant_id, connection)
                .filter(|c| *c != connection)
            {
                self.bindings.remove(&stale);
            }
            Vec::new()
        } else {
            room.add(participant_id.clone(), connection);
            room.connections_except(&participant_id)
        };
        let member_count = room.len();

        self.bindings.insert(
            connection,
            ConnectionBinding {
                room_id: room_id.clone(),
                participant_id: participant_id.clone(),
            },
        );

        if rejoin {
            debug!("{} re-joined room {}", participant_id, room_id);
        } else {
            info!(
                "{} joined room {} ({}/{})",
                participant_id,
                room_id,
                member_count,
                crate::room::ROOM_CAPACITY
            );
        }

        Ok(JoinOutcome {
            room_id,
            participant_id,
            is_initiator: member_count == 1,
            member_count,
            notify,
            previous,
        })
    }

    /// Drops whatever membership `connection` owns. Empty rooms are deleted
    /// immediately. Unbound connections are a no-op.
    pub fn leave(&mut self, connection: ConnectionId) -> Option<LeaveOutcome> {
        let binding = self.bindings.remove(&connection)?;
        let room = self.rooms.get_mut(&binding.room_id)?;

        if !room.remove(&binding.participant_id, connection) {
            return None;
        }

        let room_removed = room.is_empty();
        let remaining = room.connections();

        if room_removed {
            self.rooms.remove(&binding.room_id);
            info!("Room {} removed (empty)", binding.room_id);
        } else {
            info!("{} left room {}", binding.participant_id, binding.room_id);
        }

        Some(LeaveOutcome {
            room_id: binding.room_id,
            participant_id: binding.participant_id,
            remaining,
            room_removed,
        })
    }

    /// Everyone but the sender, provided the sender is bound to `room_id`.
    pub fn relay_targets(&self, connection: ConnectionId, room_id: &RoomId) -> Option<RelayTargets> {
        let binding = self.bindings.get(&connection)?;
        if &binding.room_id != room_id {
            return None;
        }

        let room = self.rooms.get(room_id)?;
        Some(RelayTargets {
            from: binding.participant_id.clone(),
            targets: room.connections_except(&binding.participant_id),
        })
    }

    /// Deletes rooms left with no members. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let stale: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, room)| room.is_empty())
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            self.rooms.remove(id);
        }

        if !stale.is_empty() {
            let rooms = &self.rooms;
            self.bindings.retain(|_, b| rooms.contains_key(&b.room_id));
        }

        stale.len()
    }

    pub fn list(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self.rooms.values().map(Room::summary).collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            rooms: self.rooms.len(),
            timestamp: Utc::now(),
        }
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn binding(&self, connection: &ConnectionId) -> Option<&ConnectionBinding> {
        self.bindings.get(connection)
    }

    #[cfg(test)]
    fn insert_empty_room(&mut self, room_id: RoomId) {
        self.rooms.insert(room_id.clone(), Room::new(room_id));
    }
}
