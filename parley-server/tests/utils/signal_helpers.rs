use crate::utils::CapturedSignal;
use parley_core::{ParticipantId, RoomId};
use parley_server::{ConnectionId, RendezvousCommand};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

const SIGNAL_TIMEOUT: Duration = Duration::from_secs(2);

pub fn room(id: &str) -> RoomId {
    RoomId::parse(id).expect("valid room id")
}

pub fn participant(id: &str) -> ParticipantId {
    ParticipantId::parse(id).expect("valid participant id")
}

pub async fn send_join(
    cmd_tx: &mpsc::Sender<RendezvousCommand>,
    connection: ConnectionId,
    room_id: &str,
    participant_id: &str,
) {
    cmd_tx
        .send(RendezvousCommand::Join {
            connection,
            room_id: room(room_id),
            participant_id: participant(participant_id),
        })
        .await
        .expect("rendezvous alive");
}

/// Next captured signal, failing the test after a short timeout.
pub async fn next_signal(rx: &mut mpsc::UnboundedReceiver<CapturedSignal>) -> CapturedSignal {
    timeout(SIGNAL_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for signal")
        .expect("signal channel closed")
}

pub async fn assert_no_signal(rx: &mut mpsc::UnboundedReceiver<CapturedSignal>) {
    if let Ok(Some(signal)) = timeout(Duration::from_millis(150), rx.recv()).await {
        panic!("unexpected signal: {:?}", signal);
    }
}
