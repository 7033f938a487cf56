use parley_core::ServerSignal;
use parley_server::{ConnectionId, RendezvousCommand};

use crate::integration::{create_test_rendezvous, init_tracing};
use crate::utils::{next_signal, participant, room, send_join};

#[tokio::test]
async fn test_list_rooms_returns_sorted_summaries() {
    init_tracing();

    let (cmd_tx, mut signal_rx, _signaling) = create_test_rendezvous();
    let requester = ConnectionId::new();

    send_join(&cmd_tx, ConnectionId::new(), "ZULU", "zed").await;
    send_join(&cmd_tx, ConnectionId::new(), "ALPHA", "amy").await;
    next_signal(&mut signal_rx).await;
    next_signal(&mut signal_rx).await;

    cmd_tx
        .send(RendezvousCommand::ListRooms { connection: requester })
        .await
        .unwrap();

    let (to, signal) = next_signal(&mut signal_rx).await;
    assert_eq!(to, requester);
    let ServerSignal::RoomsList { rooms } = signal else {
        panic!("expected rooms-list, got {:?}", signal);
    };

    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0].id, room("ALPHA"));
    assert_eq!(rooms[0].member_count, 1);
    assert_eq!(rooms[1].members, vec![participant("zed")]);
}
