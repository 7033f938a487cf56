use parley_client::{SessionEvent, SessionState};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{MockNetwork, spawn_rendezvous_server, spawn_session, test_config, wait_event};

#[tokio::test]
async fn test_backend_that_never_becomes_ready_fails_session() {
    init_tracing();

    let (url, _shutdown) = spawn_rendezvous_server().await;
    let network = MockNetwork::new();
    let factory = network.gated_factory();

    let mut config = test_config(&url);
    config.ready_timeout = Duration::from_millis(300);
    let (session, mut events) = spawn_session(config, &factory);

    session.create_room().unwrap();

    let event = wait_event(&mut events, |e| matches!(e, SessionEvent::Failed { .. })).await;
    let SessionEvent::Failed { reason } = event else {
        unreachable!();
    };
    assert!(reason.contains("not ready"), "unexpected reason: {reason}");
    assert_eq!(session.state(), SessionState::Failed);

    // The abandoned build must not resurface.
    factory.release();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(factory.built(), 0);
    assert_eq!(session.state(), SessionState::Failed);
}
