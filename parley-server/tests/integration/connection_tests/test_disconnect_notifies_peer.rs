use parley_core::ServerSignal;
use parley_server::{ConnectionId, RendezvousCommand};

use crate::integration::{create_test_rendezvous, init_tracing};
use crate::utils::{assert_no_signal, next_signal, participant, send_join};

#[tokio::test]
async fn test_disconnect_notifies_remaining_peer() {
    init_tracing();

    let (cmd_tx, mut signal_rx, _signaling) = create_test_rendezvous();
    let (alice, bob) = (ConnectionId::new(), ConnectionId::new());

    send_join(&cmd_tx, alice, "ABCD1234", "alice").await;
    send_join(&cmd_tx, bob, "ABCD1234", "bob").await;
    for _ in 0..3 {
        next_signal(&mut signal_rx).await;
    }

    cmd_tx
        .send(RendezvousCommand::Disconnect { connection: bob })
        .await
        .unwrap();

    let (to, signal) = next_signal(&mut signal_rx).await;
    assert_eq!(to, alice);
    assert_eq!(signal, ServerSignal::PeerLeft { peer_id: participant("bob") });
}

#[tokio::test]
async fn test_last_disconnect_removes_room() {
    init_tracing();

    let (cmd_tx, mut signal_rx, _signaling) = create_test_rendezvous();
    let alice = ConnectionId::new();

    send_join(&cmd_tx, alice, "ABCD1234", "alice").await;
    next_signal(&mut signal_rx).await;

    cmd_tx
        .send(RendezvousCommand::Disconnect { connection: alice })
        .await
        .unwrap();
    assert_no_signal(&mut signal_rx).await;

    let observer = ConnectionId::new();
    cmd_tx
        .send(RendezvousCommand::ListRooms { connection: observer })
        .await
        .unwrap();
    let (_, signal) = next_signal(&mut signal_rx).await;
    assert_eq!(signal, ServerSignal::RoomsList { rooms: vec![] });
}

#[tokio::test]
async fn test_disconnect_of_unjoined_connection_is_silent() {
    init_tracing();

    let (cmd_tx, mut signal_rx, _signaling) = create_test_rendezvous();

    cmd_tx
        .send(RendezvousCommand::Disconnect {
            connection: ConnectionId::new(),
        })
        .await
        .unwrap();

    assert_no_signal(&mut signal_rx).await;
}
