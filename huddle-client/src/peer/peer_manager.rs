use crate::error::SessionError;
use crate::media::MediaManager;
use crate::peer::peer_connection::{NegotiationState, PeerConnection, Role};
use crate::signaling::SignalingChannel;
use crate::transport::{TransportEvent, TransportFactory};
use huddle_core::{CandidateInit, PeerId, SignalKind, SignalMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Owns the peer-id → negotiation-state map. Creates, negotiates and tears
/// down individual connections; never touched by more than one handler at a
/// time because the session loop runs handlers to completion.
pub struct PeerConnectionManager {
    signaling: Arc<dyn SignalingChannel>,
    media: Arc<MediaManager>,
    transports: Arc<dyn TransportFactory>,
    event_tx: mpsc::Sender<TransportEvent>,
    peers: HashMap<PeerId, PeerConnection>,
}

impl PeerConnectionManager {
    pub fn new(
        signaling: Arc<dyn SignalingChannel>,
        media: Arc<MediaManager>,
        transports: Arc<dyn TransportFactory>,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Self {
        Self {
            signaling,
            media,
            transports,
            event_tx,
            peers: HashMap::new(),
        }
    }

    /// Allocate a connection for `peer_id` and, as initiator, send the
    /// offer. Media is acquired first so a denied capture aborts before any
    /// entry exists.
    pub async fn create(
        &mut self,
        peer_id: PeerId,
        username: &str,
        role: Role,
    ) -> Result<(), SessionError> {
        if self.peers.contains_key(&peer_id) {
            return Err(SessionError::DuplicatePeer(peer_id));
        }

        let media = self.media.ensure_local().await?;

        let transport = match self.transports.connect(peer_id, self.event_tx.clone()).await {
            Ok(transport) => transport,
            Err(error) => {
                self.media.release().await;
                return Err(error.into());
            }
        };

        if let Err(error) = transport.attach_local(&media).await {
            let _ = transport.close().await;
            self.media.release().await;
            return Err(error.into());
        }

        let mut entry = PeerConnection::new(peer_id, username, role, transport);

        if role == Role::Initiator {
            let sdp = match entry.transport.create_offer().await {
                Ok(sdp) => sdp,
                Err(error) => {
                    let _ = entry.transport.close().await;
                    self.media.release().await;
                    return Err(error.into());
                }
            };
            entry.state = NegotiationState::OfferSent;
            debug!(peer = %peer_id, "sending offer");
            self.signaling
                .send(SignalMessage::to(peer_id, SignalKind::Offer { sdp }))
                .await;
        }

        self.peers.insert(peer_id, entry);
        Ok(())
    }

    /// Apply a remote offer on an answerer entry, flush buffered candidates
    /// and reply with an answer. Anything else is logged and discarded.
    pub async fn handle_offer(&mut self, peer_id: PeerId, sdp: String) {
        let signaling = self.signaling.clone();
        let Some(entry) = self.peers.get_mut(&peer_id) else {
            debug!(peer = %peer_id, "offer for unknown peer, discarding");
            return;
        };

        if entry.role != Role::Answerer || entry.state != NegotiationState::New {
            warn!(
                peer = %peer_id,
                role = ?entry.role,
                state = ?entry.state,
                "unexpected offer, discarding"
            );
            return;
        }

        if let Err(error) = entry.transport.set_remote_offer(sdp).await {
            warn!(peer = %peer_id, "failed to apply remote offer: {error}");
            return;
        }
        entry.remote_description_set = true;
        entry.state = NegotiationState::OfferReceived;
        Self::flush_candidates(entry).await;

        match entry.transport.create_answer().await {
            Ok(sdp) => {
                entry.state = NegotiationState::AnswerSent;
                debug!(peer = %peer_id, "sending answer");
                signaling
                    .send(SignalMessage::to(peer_id, SignalKind::Answer { sdp }))
                    .await;
            }
            Err(error) => warn!(peer = %peer_id, "failed to create answer: {error}"),
        }
    }

    /// Apply a remote answer on an initiator entry that is still waiting for
    /// one. Duplicate or late answers are discarded; re-delivery must not
    /// re-apply remote state.
    pub async fn handle_answer(&mut self, peer_id: PeerId, sdp: String) {
        let Some(entry) = self.peers.get_mut(&peer_id) else {
            debug!(peer = %peer_id, "answer for unknown peer, discarding");
            return;
        };

        if entry.role != Role::Initiator || entry.state != NegotiationState::OfferSent {
            debug!(
                peer = %peer_id,
                role = ?entry.role,
                state = ?entry.state,
                "stale answer, discarding"
            );
            return;
        }

        if let Err(error) = entry.transport.set_remote_answer(sdp).await {
            warn!(peer = %peer_id, "failed to apply remote answer: {error}");
            return;
        }
        entry.remote_description_set = true;
        entry.state = NegotiationState::AnswerReceived;
        Self::flush_candidates(entry).await;
    }

    /// Buffer until the remote description is applied, then apply directly.
    pub async fn handle_candidate(&mut self, peer_id: PeerId, candidate: CandidateInit) {
        let Some(entry) = self.peers.get_mut(&peer_id) else {
            debug!(peer = %peer_id, "candidate for unknown peer, discarding");
            return;
        };

        if !entry.remote_description_set {
            entry.pending_remote_candidates.push(candidate);
            return;
        }

        if let Err(error) = entry.transport.add_candidate(candidate).await {
            warn!(peer = %peer_id, "failed to add candidate: {error}");
        }
    }

    async fn flush_candidates(entry: &mut PeerConnection) {
        for candidate in std::mem::take(&mut entry.pending_remote_candidates) {
            if let Err(error) = entry.transport.add_candidate(candidate).await {
                warn!(peer = %entry.peer_id, "failed to add buffered candidate: {error}");
            }
        }
    }

    /// Called when the transport reports end-to-end connectivity. Returns
    /// whether the entry actually transitioned.
    pub fn mark_connected(&mut self, peer_id: PeerId) -> bool {
        match self.peers.get_mut(&peer_id) {
            Some(entry) if entry.state != NegotiationState::Closed => {
                entry.state = NegotiationState::Connected;
                true
            }
            _ => false,
        }
    }

    /// Tear down one connection and drop its media reference. Idempotent:
    /// closing an absent peer returns false and does nothing.
    pub async fn close(&mut self, peer_id: PeerId) -> bool {
        let Some(mut entry) = self.peers.remove(&peer_id) else {
            return false;
        };
        entry.state = NegotiationState::Closed;
        if let Err(error) = entry.transport.close().await {
            warn!(peer = %peer_id, "error closing transport: {error}");
        }
        self.media.release().await;
        true
    }

    pub async fn close_all(&mut self) {
        let peer_ids: Vec<PeerId> = self.peers.keys().copied().collect();
        for peer_id in peer_ids {
            self.close(peer_id).await;
        }
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn role_of(&self, peer_id: &PeerId) -> Option<Role> {
        self.peers.get(peer_id).map(|entry| entry.role)
    }

    pub fn state_of(&self, peer_id: &PeerId) -> Option<NegotiationState> {
        self.peers.get(peer_id).map(|entry| entry.state)
    }

    pub fn peer_ids(&self) -> Vec<PeerId> {
        self.peers.keys().copied().collect()
    }
}
