pub mod connection_tests;
pub mod ws_tests;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use parley_server::{Rendezvous, RendezvousCommand};

use crate::utils::{CapturedSignal, MockSignalingOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_rendezvous() -> (
    mpsc::Sender<RendezvousCommand>,
    mpsc::UnboundedReceiver<CapturedSignal>,
    MockSignalingOutput,
) {
    create_test_rendezvous_with_sweep(Duration::from_secs(30))
}

pub fn create_test_rendezvous_with_sweep(
    sweep_interval: Duration,
) -> (
    mpsc::Sender<RendezvousCommand>,
    mpsc::UnboundedReceiver<CapturedSignal>,
    MockSignalingOutput,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RendezvousCommand>(100);
    let (signaling, signal_rx) = MockSignalingOutput::new();

    let rendezvous = Rendezvous::new(cmd_rx, Arc::new(signaling.clone()), sweep_interval);

    tokio::spawn(async move {
        rendezvous.run().await;
    });

    (cmd_tx, signal_rx, signaling)
}
