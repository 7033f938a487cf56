use crate::utils::MockBackendFactory;
use parley_client::{ChatSession, EngineConfig, SessionEvent, SessionState, WsConnector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn test_config(url: &str) -> EngineConfig {
    EngineConfig {
        signaling_url: url.to_string(),
        connect_timeout: Duration::from_secs(5),
        ready_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

pub fn spawn_session(
    config: EngineConfig,
    factory: &MockBackendFactory,
) -> (ChatSession, mpsc::UnboundedReceiver<SessionEvent>) {
    let connector = Arc::new(WsConnector::new(config.signaling_url.clone()));
    ChatSession::spawn(config, connector, Arc::new(factory.clone()))
}

pub async fn wait_state(session: &ChatSession, target: SessionState) {
    timeout(WAIT, session.wait_for_state(target))
        .await
        .unwrap_or_else(|_| {
            panic!(
                "timed out waiting for {target}, session is {}",
                session.state()
            )
        })
        .expect("session engine stopped");
}

/// Skips events until one matches.
pub async fn wait_event<F>(events: &mut mpsc::UnboundedReceiver<SessionEvent>, pred: F) -> SessionEvent
where
    F: Fn(&SessionEvent) -> bool,
{
    timeout(WAIT, async {
        while let Some(event) = events.recv().await {
            if pred(&event) {
                return event;
            }
        }
        panic!("event channel closed");
    })
    .await
    .expect("timed out waiting for session event")
}

/// Polls `cond` until it holds.
pub async fn eventually<F>(what: &str, cond: F)
where
    F: Fn() -> bool,
{
    timeout(WAIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}
