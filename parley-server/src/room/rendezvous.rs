use crate::error::RendezvousError;
use crate::room::{LeaveOutcome, RelayPayload, RendezvousCommand, RoomRegistry};
use crate::signaling::{ConnectionId, SignalingOutput};
use parley_core::{ParticipantId, RoomId, ServerSignal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Single owner of the room registry.
///
/// Joins, relays, disconnects and the periodic sweep are all serialized
/// through `run`, so no two operations ever observe a half-applied update.
pub struct Rendezvous {
    registry: RoomRegistry,
    command_rx: mpsc::Receiver<RendezvousCommand>,
    signaling: Arc<dyn SignalingOutput>,
    sweep_interval: Duration,
}

impl Rendezvous {
    pub fn new(
        command_rx: mpsc::Receiver<RendezvousCommand>,
        signaling: Arc<dyn SignalingOutput>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            registry: RoomRegistry::new(),
            command_rx,
            signaling,
            sweep_interval,
        }
    }

    pub async fn run(mut self) {
        info!("Rendezvous event loop started");

        let mut sweep = tokio::time::interval(self.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        sweep.tick().await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down rendezvous.");
                            break;
                        }
                    }
                }

                _ = sweep.tick() => {
                    let removed = self.registry.sweep();
                    if removed > 0 {
                        info!("Sweep removed {} empty room(s)", removed);
                    }
                }
            }
        }

        info!("Rendezvous event loop finished");
    }

    async fn handle_command(&mut self, cmd: RendezvousCommand) {
        match cmd {
            RendezvousCommand::Join {
                connection,
                room_id,
                participant_id,
            } => self.handle_join(connection, room_id, participant_id).await,

            RendezvousCommand::Relay {
                connection,
                room_id,
                payload,
            } => self.handle_relay(connection, room_id, payload).await,

            RendezvousCommand::ListRooms { connection } => {
                let rooms = self.registry.list();
                self.signaling
                    .send_signal(connection, ServerSignal::RoomsList { rooms })
                    .await;
            }

            RendezvousCommand::Disconnect { connection } => {
                if let Some(outcome) = self.registry.leave(connection) {
                    self.announce_departure(outcome).await;
                }
            }

            RendezvousCommand::Status { reply } => {
                let _ = reply.send(self.registry.status());
            }
        }
    }

    async fn handle_join(
        &mut self,
        connection: ConnectionId,
        room_id: RoomId,
        participant_id: ParticipantId,
    ) {
        let outcome = match self.registry.join(connection, room_id, participant_id) {
            Ok(outcome) => outcome,
            Err(RendezvousError::RoomFull { room_id }) => {
                info!("Room {} is full, rejecting {}", room_id, connection);
                self.signaling
                    .send_signal(connection, ServerSignal::RoomFull { room_id })
                    .await;
                return;
            }
            Err(e) => {
                warn!("Join from {} failed: {}", connection, e);
                return;
            }
        };

        if let Some(previous) = outcome.previous.clone() {
            self.announce_departure(previous).await;
        }

        for peer in &outcome.notify {
            self.signaling
                .send_signal(
                    *peer,
                    ServerSignal::PeerJoined {
                        peer_id: outcome.participant_id.clone(),
                        room_id: outcome.room_id.clone(),
                        is_initiator: outcome.is_initiator,
                    },
                )
                .await;
        }

        self.signaling
            .send_signal(
                connection,
                ServerSignal::RoomJoined {
                    room_id: outcome.room_id,
                    participant_id: outcome.participant_id,
                    is_initiator: outcome.is_initiator,
                    member_count: outcome.member_count,
                },
            )
            .await;
    }

    async fn handle_relay(&mut self, connection: ConnectionId, room_id: RoomId, payload: RelayPayload) {
        let Some(relay) = self.registry.relay_targets(connection, &room_id) else {
            warn!(
                "Dropping {} from {}: not a member of room {}",
                payload.kind(),
                connection,
                room_id
            );
            return;
        };

        debug!(
            "Relaying {} from {} to {} peer(s)",
            payload.kind(),
            relay.from,
            relay.targets.len()
        );

        for target in relay.targets {
            let signal = payload.clone().into_signal(room_id.clone(), relay.from.clone());
            self.signaling.send_signal(target, signal).await;
        }
    }

    async fn announce_departure(&self, outcome: LeaveOutcome) {
        for peer in outcome.remaining {
            self.signaling
                .send_signal(
                    peer,
                    ServerSignal::PeerLeft {
                        peer_id: outcome.participant_id.clone(),
                    },
                )
                .await;
        }
    }
}
