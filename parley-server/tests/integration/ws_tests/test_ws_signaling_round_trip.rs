use futures::{SinkExt, StreamExt};
use parley_core::{ClientSignal, ServerSignal, SessionDescription};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::integration::init_tracing;
use crate::integration::ws_tests::spawn_test_server;
use crate::utils::{participant, room};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    socket
}

async fn send(socket: &mut Socket, signal: &ClientSignal) {
    let json = serde_json::to_string(signal).unwrap();
    socket.send(Message::Text(json)).await.unwrap();
}

async fn recv(socket: &mut Socket) -> ServerSignal {
    loop {
        let msg = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for server signal")
            .expect("socket closed")
            .unwrap();

        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_two_clients_negotiate_through_server() {
    init_tracing();

    let (addr, _shutdown) = spawn_test_server().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;

    send(
        &mut alice,
        &ClientSignal::JoinRoom {
            room_id: room("ABCD1234"),
            participant_id: participant("alice"),
        },
    )
    .await;
    assert!(matches!(
        recv(&mut alice).await,
        ServerSignal::RoomJoined { is_initiator: true, .. }
    ));

    send(
        &mut bob,
        &ClientSignal::JoinRoom {
            room_id: room("ABCD1234"),
            participant_id: participant("bob"),
        },
    )
    .await;
    assert!(matches!(
        recv(&mut bob).await,
        ServerSignal::RoomJoined { member_count: 2, .. }
    ));
    assert_eq!(
        recv(&mut alice).await,
        ServerSignal::PeerJoined {
            peer_id: participant("bob"),
            room_id: room("ABCD1234"),
            is_initiator: false,
        }
    );

    send(
        &mut alice,
        &ClientSignal::SessionOffer {
            room_id: room("ABCD1234"),
            target_peer_id: None,
            description: SessionDescription::offer("v=0"),
        },
    )
    .await;
    assert_eq!(
        recv(&mut bob).await,
        ServerSignal::SessionOffer {
            room_id: room("ABCD1234"),
            from_peer_id: participant("alice"),
            description: SessionDescription::offer("v=0"),
        }
    );

    bob.close(None).await.unwrap();
    assert_eq!(
        recv(&mut alice).await,
        ServerSignal::PeerLeft {
            peer_id: participant("bob"),
        }
    );
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    init_tracing();

    let (addr, _shutdown) = spawn_test_server().await;
    let mut socket = connect(addr).await;

    socket
        .send(Message::Text("{\"type\":\"bogus\"}".to_string()))
        .await
        .unwrap();
    socket.send(Message::Text("not json".to_string())).await.unwrap();

    send(&mut socket, &ClientSignal::ListRooms).await;
    assert_eq!(recv(&mut socket).await, ServerSignal::RoomsList { rooms: vec![] });
}
