use async_trait::async_trait;
use parley_client::{
    BackendFactory, ClientError, NegotiationBackend, PathState, TransportEvent, TransportEvents,
};
use parley_core::{PathCandidate, SessionDescription};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Debug, Default)]
struct PeerFlags {
    local_set: bool,
    remote_set: bool,
    open: bool,
    closed: bool,
}

/// One simulated endpoint. Records every backend call.
#[derive(Debug)]
pub struct MockPeer {
    pub id: usize,
    events: TransportEvents,
    flags: Mutex<PeerFlags>,
    log: Mutex<Vec<String>>,
    violations: Mutex<Vec<String>>,
}

impl MockPeer {
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn violations(&self) -> Vec<String> {
        self.violations.lock().unwrap().clone()
    }

    pub fn emit(&self, event: TransportEvent) {
        self.events.emit(event);
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }

    fn gather(&self) {
        self.events
            .emit(TransportEvent::LocalCandidate(Some(PathCandidate::new(format!(
                "candidate:{} 1 udp 2122260223 10.0.0.{} 5000 typ host",
                self.id, self.id
            )))));
        self.events.emit(TransportEvent::LocalCandidate(None));
    }
}

/// In-memory stand-in for two WebRTC stacks talking to each other.
///
/// A pair of peers whose descriptions are both applied gets an open channel;
/// text sent by one arrives at every other open peer.
#[derive(Debug, Clone, Default)]
pub struct MockNetwork {
    peers: Arc<Mutex<Vec<Arc<MockPeer>>>>,
    quiet_close: Arc<AtomicBool>,
    offer_gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&self) -> MockBackendFactory {
        MockBackendFactory {
            network: self.clone(),
            gate: None,
            built: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Factory whose builds block until [`MockBackendFactory::release`].
    pub fn gated_factory(&self) -> MockBackendFactory {
        MockBackendFactory {
            network: self.clone(),
            gate: Some(Arc::new(Semaphore::new(0))),
            built: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn peers(&self) -> Vec<Arc<MockPeer>> {
        self.peers.lock().unwrap().clone()
    }

    /// The peer that produced an offer.
    pub fn initiator(&self) -> Option<Arc<MockPeer>> {
        self.find(|entry| entry == "create-offer")
    }

    /// The peer that answered an offer.
    pub fn responder(&self) -> Option<Arc<MockPeer>> {
        self.find(|entry| entry.starts_with("accept-offer"))
    }

    pub fn violations(&self) -> Vec<String> {
        self.peers().iter().flat_map(|p| p.violations()).collect()
    }

    /// Closing a transport no longer tells the other side, as when a peer
    /// vanishes without a clean channel shutdown.
    pub fn silence_channel_close(&self) {
        self.quiet_close.store(true, Ordering::SeqCst);
    }

    /// From now on `accept_offer` stalls until [`MockNetwork::release_offers`].
    pub fn hold_offers(&self) {
        *self.offer_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_offers(&self) {
        if let Some(gate) = self.offer_gate.lock().unwrap().as_ref() {
            gate.add_permits(64);
        }
    }

    /// Every peer whose log has an entry matching `pred`.
    pub fn peers_with(&self, pred: impl Fn(&str) -> bool) -> Vec<Arc<MockPeer>> {
        self.peers()
            .into_iter()
            .filter(|p| p.log().iter().any(|entry| pred(entry)))
            .collect()
    }

    pub fn fail_path(&self, peer: &MockPeer) {
        peer.emit(TransportEvent::PathState(PathState::Failed));
    }

    fn find(&self, pred: impl Fn(&str) -> bool) -> Option<Arc<MockPeer>> {
        self.peers()
            .into_iter()
            .find(|p| p.log().iter().any(|entry| pred(entry)))
    }

    fn register(&self, events: TransportEvents) -> Arc<MockPeer> {
        let mut peers = self.peers.lock().unwrap();
        let peer = Arc::new(MockPeer {
            id: peers.len() + 1,
            events,
            flags: Mutex::new(PeerFlags::default()),
            log: Mutex::new(Vec::new()),
            violations: Mutex::new(Vec::new()),
        });
        peers.push(peer.clone());
        peer
    }

    fn try_open(&self) {
        let peers = self.peers();
        let ready: Vec<&Arc<MockPeer>> = peers
            .iter()
            .filter(|p| {
                let flags = p.flags.lock().unwrap();
                flags.local_set && flags.remote_set && !flags.open && !flags.closed
            })
            .collect();

        if ready.len() < 2 {
            return;
        }
        for peer in ready.into_iter().take(2) {
            peer.flags.lock().unwrap().open = true;
            peer.emit(TransportEvent::PathState(PathState::Connected));
            peer.emit(TransportEvent::ChannelOpen);
        }
    }

    fn open_peers_except(&self, id: usize) -> Vec<Arc<MockPeer>> {
        self.peers()
            .into_iter()
            .filter(|p| {
                let flags = p.flags.lock().unwrap();
                p.id != id && flags.open && !flags.closed
            })
            .collect()
    }
}

pub struct MockBackend {
    peer: Arc<MockPeer>,
    network: MockNetwork,
}

#[async_trait]
impl NegotiationBackend for MockBackend {
    async fn create_offer(&self) -> Result<SessionDescription, ClientError> {
        self.peer.record("create-offer");
        self.peer.flags.lock().unwrap().local_set = true;
        self.peer.gather();
        Ok(SessionDescription::offer(format!("mock-offer-{}", self.peer.id)))
    }

    async fn accept_offer(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, ClientError> {
        self.peer.record("begin-accept-offer");
        let gate = self.network.offer_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| ClientError::Negotiation("offer gate closed".to_string()))?;
            permit.forget();
        }

        self.peer.record(format!("accept-offer:{}", offer.sdp));
        {
            let mut flags = self.peer.flags.lock().unwrap();
            flags.remote_set = true;
            flags.local_set = true;
        }
        self.peer.gather();
        self.network.try_open();
        Ok(SessionDescription::answer(format!("mock-answer-{}", self.peer.id)))
    }

    async fn accept_answer(&self, answer: SessionDescription) -> Result<(), ClientError> {
        self.peer.record(format!("accept-answer:{}", answer.sdp));
        self.peer.flags.lock().unwrap().remote_set = true;
        self.network.try_open();
        Ok(())
    }

    async fn add_candidate(&self, candidate: PathCandidate) -> Result<(), ClientError> {
        if !self.peer.flags.lock().unwrap().remote_set {
            self.peer
                .violations
                .lock()
                .unwrap()
                .push(format!("candidate before remote description: {}", candidate.candidate));
        }
        self.peer.record(format!("add-candidate:{}", candidate.candidate));
        Ok(())
    }

    async fn send(&self, text: String) -> Result<(), ClientError> {
        if !self.peer.flags.lock().unwrap().open {
            return Err(ClientError::NotConnected);
        }
        self.peer.record(format!("send:{text}"));
        for other in self.network.open_peers_except(self.peer.id) {
            other.emit(TransportEvent::ChannelMessage(text.clone()));
        }
        Ok(())
    }

    async fn close_transport(&self) -> Result<(), ClientError> {
        self.peer.record("close-transport");
        let was_open = {
            let mut flags = self.peer.flags.lock().unwrap();
            let was_open = flags.open && !flags.closed;
            flags.closed = true;
            was_open
        };
        if was_open && !self.network.quiet_close.load(Ordering::SeqCst) {
            for other in self.network.open_peers_except(self.peer.id) {
                other.flags.lock().unwrap().closed = true;
                other.emit(TransportEvent::ChannelClosed);
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.peer.record("close");
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockBackendFactory {
    network: MockNetwork,
    gate: Option<Arc<Semaphore>>,
    built: Arc<AtomicUsize>,
}

impl MockBackendFactory {
    /// Lets one pending or future build complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendFactory for MockBackendFactory {
    async fn build(
        &self,
        events: TransportEvents,
    ) -> Result<Arc<dyn NegotiationBackend>, ClientError> {
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| ClientError::Negotiation("gate closed".to_string()))?;
            permit.forget();
        }

        let peer = self.network.register(events);
        self.built.fetch_add(1, Ordering::SeqCst);

        Ok(Arc::new(MockBackend {
            peer,
            network: self.network.clone(),
        }))
    }
}
