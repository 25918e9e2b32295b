use crate::error::TransportError;
use crate::media::LocalMedia;
use crate::transport::TransportEvent;
use async_trait::async_trait;
use huddle_core::{CandidateInit, PeerId};
use tokio::sync::mpsc;

/// One negotiation primitive, owned by exactly one peer connection entry.
/// The production implementation is [`crate::RtcTransport`]; tests substitute
/// recording fakes so the lifecycle can be driven without a network.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Attach the shared local tracks before any SDP is produced.
    async fn attach_local(&self, media: &LocalMedia) -> Result<(), TransportError>;

    /// Produce an offer and install it as the local description.
    async fn create_offer(&self) -> Result<String, TransportError>;

    async fn set_remote_offer(&self, sdp: String) -> Result<(), TransportError>;

    /// Produce an answer and install it as the local description.
    async fn create_answer(&self) -> Result<String, TransportError>;

    async fn set_remote_answer(&self, sdp: String) -> Result<(), TransportError>;

    async fn add_candidate(&self, candidate: CandidateInit) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Build a transport for `peer_id` that reports candidates, connectivity
    /// and remote tracks over `events`.
    async fn connect(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>, TransportError>;
}
