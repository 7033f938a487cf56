use parley_core::{PathCandidate, ServerSignal};
use parley_server::{ConnectionId, RelayPayload, RendezvousCommand};

use crate::integration::{create_test_rendezvous, init_tracing};
use crate::utils::{next_signal, participant, room, send_join};

#[tokio::test]
async fn test_candidates_are_relayed_in_order() {
    init_tracing();

    let (cmd_tx, mut signal_rx, _signaling) = create_test_rendezvous();
    let (alice, bob) = (ConnectionId::new(), ConnectionId::new());

    send_join(&cmd_tx, alice, "ABCD1234", "alice").await;
    send_join(&cmd_tx, bob, "ABCD1234", "bob").await;
    for _ in 0..3 {
        next_signal(&mut signal_rx).await;
    }

    let candidates = vec![
        Some(PathCandidate::new("candidate:1 1 udp 2122260223 10.0.0.1 50000 typ host")),
        Some(PathCandidate::new("candidate:2 1 udp 1686052607 203.0.113.9 50001 typ srflx")),
        None,
    ];

    for candidate in &candidates {
        cmd_tx
            .send(RendezvousCommand::Relay {
                connection: alice,
                room_id: room("ABCD1234"),
                payload: RelayPayload::Candidate {
                    candidate: candidate.clone(),
                },
            })
            .await
            .unwrap();
    }

    for expected in candidates {
        let (to, signal) = next_signal(&mut signal_rx).await;
        assert_eq!(to, bob);
        assert_eq!(
            signal,
            ServerSignal::PathCandidate {
                room_id: room("ABCD1234"),
                from_peer_id: participant("alice"),
                candidate: expected,
            }
        );
    }
}
