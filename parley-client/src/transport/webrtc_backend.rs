use crate::error::ClientError;
use crate::transport::{
    BackendFactory, NegotiationBackend, PathState, TransportConfig, TransportEvent, TransportEvents,
};
use async_trait::async_trait;
use parley_core::utils::CHAT_CHANNEL_LABEL;
use parley_core::{PathCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

type ChannelSlot = Arc<Mutex<Option<Arc<RTCDataChannel>>>>;

/// [`NegotiationBackend`] over a webrtc-rs peer connection.
pub struct WebRtcBackend {
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: ChannelSlot,
    events: TransportEvents,
}

impl WebRtcBackend {
    pub async fn new(config: &TransportConfig, events: TransportEvents) -> Result<Self, ClientError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);
        let data_channel: ChannelSlot = Arc::new(Mutex::new(None));

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                    if let Some(state) = map_path_state(s) {
                        events.emit(TransportEvent::PathState(state));
                    }
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();

            Box::pin(async move {
                let Some(candidate) = c else {
                    events.emit(TransportEvent::LocalCandidate(None));
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => events.emit(TransportEvent::LocalCandidate(Some(PathCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                        username_fragment: init.username_fragment,
                    }))),
                    Err(e) => warn!("Failed to serialize local candidate: {}", e),
                }
            })
        }));

        // Answerer side: the initiator's channel arrives here.
        let dc_events = events.clone();
        let dc_slot = data_channel.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let events = dc_events.clone();
            let slot = dc_slot.clone();

            Box::pin(async move {
                if dc.label() != CHAT_CHANNEL_LABEL {
                    warn!("Ignoring unexpected data channel '{}'", dc.label());
                    return;
                }
                debug!("Remote data channel '{}' announced", dc.label());
                wire_channel(&dc, &events);
                *slot.lock().await = Some(dc);
            })
        }));

        Ok(Self {
            peer_connection,
            data_channel,
            events,
        })
    }
}

#[async_trait]
impl NegotiationBackend for WebRtcBackend {
    async fn create_offer(&self) -> Result<SessionDescription, ClientError> {
        let init = RTCDataChannelInit {
            ordered: Some(true),
            ..Default::default()
        };
        let dc = self
            .peer_connection
            .create_data_channel(CHAT_CHANNEL_LABEL, Some(init))
            .await?;
        wire_channel(&dc, &self.events);
        *self.data_channel.lock().await = Some(dc);

        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn accept_offer(
        &self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, ClientError> {
        let desc = RTCSessionDescription::offer(offer.sdp)?;
        self.peer_connection.set_remote_description(desc).await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn accept_answer(&self, answer: SessionDescription) -> Result<(), ClientError> {
        let desc = RTCSessionDescription::answer(answer.sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_candidate(&self, candidate: PathCandidate) -> Result<(), ClientError> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            })
            .await?;
        Ok(())
    }

    async fn send(&self, text: String) -> Result<(), ClientError> {
        let slot = self.data_channel.lock().await;
        let Some(dc) = slot.as_ref() else {
            return Err(ClientError::NotConnected);
        };
        if dc.ready_state() != RTCDataChannelState::Open {
            return Err(ClientError::NotConnected);
        }
        dc.send_text(text).await?;
        Ok(())
    }

    async fn close_transport(&self) -> Result<(), ClientError> {
        let Some(dc) = self.data_channel.lock().await.take() else {
            return Ok(());
        };
        dc.close().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn wire_channel(dc: &Arc<RTCDataChannel>, events: &TransportEvents) {
    let open_events = events.clone();
    let label = dc.label().to_owned();
    dc.on_open(Box::new(move || {
        Box::pin(async move {
            info!("Data channel '{}' open", label);
            open_events.emit(TransportEvent::ChannelOpen);
        })
    }));

    let msg_events = events.clone();
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let events = msg_events.clone();
        Box::pin(async move {
            match String::from_utf8(msg.data.to_vec()) {
                Ok(text) => events.emit(TransportEvent::ChannelMessage(text)),
                Err(_) => warn!("Dropping non-UTF-8 data channel frame"),
            }
        })
    }));

    let close_events = events.clone();
    dc.on_close(Box::new(move || {
        let events = close_events.clone();
        Box::pin(async move {
            events.emit(TransportEvent::ChannelClosed);
        })
    }));

    let err_events = events.clone();
    dc.on_error(Box::new(move |err| {
        let events = err_events.clone();
        Box::pin(async move {
            events.emit(TransportEvent::ChannelError(err.to_string()));
        })
    }));
}

fn map_path_state(state: RTCPeerConnectionState) -> Option<PathState> {
    match state {
        RTCPeerConnectionState::New => Some(PathState::New),
        RTCPeerConnectionState::Connecting => Some(PathState::Connecting),
        RTCPeerConnectionState::Connected => Some(PathState::Connected),
        RTCPeerConnectionState::Disconnected => Some(PathState::Disconnected),
        RTCPeerConnectionState::Failed => Some(PathState::Failed),
        RTCPeerConnectionState::Closed => Some(PathState::Closed),
        RTCPeerConnectionState::Unspecified => None,
    }
}

/// Builds a [`WebRtcBackend`] per session.
#[derive(Debug, Clone, Default)]
pub struct WebRtcBackendFactory {
    config: TransportConfig,
}

impl WebRtcBackendFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BackendFactory for WebRtcBackendFactory {
    async fn build(
        &self,
        events: TransportEvents,
    ) -> Result<Arc<dyn NegotiationBackend>, ClientError> {
        let backend = WebRtcBackend::new(&self.config, events).await?;
        Ok(Arc::new(backend))
    }
}
