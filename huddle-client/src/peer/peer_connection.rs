use crate::transport::PeerTransport;
use huddle_core::{CandidateInit, PeerId};

/// Which side of the pair produces the offer. Whoever was already in the
/// room when the other joined initiates; the newcomer answers. That
/// asymmetry is what guarantees exactly one offer per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Answerer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    OfferSent,
    OfferReceived,
    AnswerSent,
    AnswerReceived,
    Connected,
    Closed,
}

/// One peer's negotiation state, owned exclusively by
/// [`crate::PeerConnectionManager`].
pub struct PeerConnection {
    pub peer_id: PeerId,
    pub username: String,
    pub role: Role,
    pub state: NegotiationState,
    /// Candidates that arrived before the remote description, in arrival
    /// order. Flushed the moment the description is applied; dropping them
    /// would silently corrupt the media path.
    pub(crate) pending_remote_candidates: Vec<CandidateInit>,
    pub(crate) remote_description_set: bool,
    pub(crate) transport: Box<dyn PeerTransport>,
}

impl PeerConnection {
    pub(crate) fn new(
        peer_id: PeerId,
        username: &str,
        role: Role,
        transport: Box<dyn PeerTransport>,
    ) -> Self {
        Self {
            peer_id,
            username: username.to_owned(),
            role,
            state: NegotiationState::New,
            pending_remote_candidates: Vec::new(),
            remote_description_set: false,
            transport,
        }
    }
}
