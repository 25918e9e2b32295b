use crate::error::TransportError;
use crate::media::LocalMedia;
use crate::transport::peer_transport::{PeerTransport, TransportFactory};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use async_trait::async_trait;
use huddle_core::{CandidateInit, PeerId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Production negotiation primitive over the `webrtc` crate.
pub struct RtcTransport {
    peer_id: PeerId,
    pc: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    pub async fn new(
        peer_id: PeerId,
        config: TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
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

        let pc = Arc::new(api.new_peer_connection(rtc_config).await?);

        // Connectivity changes drive the Connected/Closed transitions in the
        // session loop.
        let state_tx = event_tx.clone();
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                info!(peer = %peer_id, ?state, "peer connection state changed");
                match state {
                    RTCPeerConnectionState::Connected => {
                        let _ = tx.send(TransportEvent::Connected(peer_id)).await;
                    }
                    RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Closed => {
                        let _ = tx.send(TransportEvent::Disconnected(peer_id)).await;
                    }
                    _ => {}
                }
            })
        }));

        // Trickle ICE: relay local candidates as they are discovered.
        let ice_tx = event_tx.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else { return };
                let candidate = CandidateInit {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(peer_id, candidate))
                    .await;
            })
        }));

        let track_tx = event_tx;
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                let _ = tx.send(TransportEvent::RemoteTrack(peer_id, track)).await;
            })
        }));

        Ok(Self { peer_id, pc })
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn attach_local(&self, media: &LocalMedia) -> Result<(), TransportError> {
        for track in &media.tracks {
            self.pc.add_track(track.clone()).await?;
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<String, TransportError> {
        let offer = self.pc.create_offer(None).await?;
        self.pc.set_local_description(offer.clone()).await?;
        Ok(offer.sdp)
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<(), TransportError> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.pc.set_remote_description(desc).await?;
        Ok(())
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        let answer = self.pc.create_answer(None).await?;
        self.pc.set_local_description(answer.clone()).await?;
        Ok(answer.sdp)
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<(), TransportError> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.pc.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_candidate(&self, candidate: CandidateInit) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            ..Default::default()
        };
        self.pc.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.pc.close().await?;
        Ok(())
    }
}

/// Builds [`RtcTransport`] instances with a shared ICE configuration.
pub struct RtcTransportFactory {
    config: TransportConfig,
}

impl RtcTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl Default for RtcTransportFactory {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn connect(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>, TransportError> {
        let transport = RtcTransport::new(peer_id, self.config.clone(), events).await?;
        Ok(Box::new(transport))
    }
}
