use async_trait::async_trait;
use huddle_client::{
    LocalMedia, PeerTransport, TransportError, TransportEvent, TransportFactory,
};
use huddle_core::{CandidateInit, PeerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Everything a peer transport was asked to do, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    AttachLocal,
    CreateOffer,
    SetRemoteOffer(String),
    CreateAnswer,
    SetRemoteAnswer(String),
    AddCandidate(String),
    Close,
}

pub struct MockTransport {
    peer_id: PeerId,
    calls: Arc<Mutex<Vec<TransportCall>>>,
}

impl MockTransport {
    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn attach_local(&self, _media: &LocalMedia) -> Result<(), TransportError> {
        self.record(TransportCall::AttachLocal);
        Ok(())
    }

    async fn create_offer(&self) -> Result<String, TransportError> {
        self.record(TransportCall::CreateOffer);
        Ok(format!("offer-sdp-{}", self.peer_id))
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<(), TransportError> {
        self.record(TransportCall::SetRemoteOffer(sdp));
        Ok(())
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        self.record(TransportCall::CreateAnswer);
        Ok(format!("answer-sdp-{}", self.peer_id))
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<(), TransportError> {
        self.record(TransportCall::SetRemoteAnswer(sdp));
        Ok(())
    }

    async fn add_candidate(&self, candidate: CandidateInit) -> Result<(), TransportError> {
        self.record(TransportCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Close);
        Ok(())
    }
}

/// Factory that hands out recording transports and keeps their call logs and
/// event senders so tests can inspect negotiation order and inject
/// connectivity events.
#[derive(Default)]
pub struct MockTransportFactory {
    calls: Mutex<HashMap<PeerId, Arc<Mutex<Vec<TransportCall>>>>>,
    connect_order: Mutex<Vec<PeerId>>,
    event_txs: Mutex<HashMap<PeerId, mpsc::Sender<TransportEvent>>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected_peers(&self) -> Vec<PeerId> {
        self.connect_order.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connect_order.lock().unwrap().len()
    }

    pub fn calls_for(&self, peer_id: PeerId) -> Vec<TransportCall> {
        self.calls
            .lock()
            .unwrap()
            .get(&peer_id)
            .map(|calls| calls.lock().unwrap().clone())
            .unwrap_or_default()
    }

    pub fn was_closed(&self, peer_id: PeerId) -> bool {
        self.calls_for(peer_id).contains(&TransportCall::Close)
    }

    /// Sender for injecting transport events (e.g. `Connected`) for a peer.
    pub fn events_for(&self, peer_id: PeerId) -> Option<mpsc::Sender<TransportEvent>> {
        self.event_txs.lock().unwrap().get(&peer_id).cloned()
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn connect(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>, TransportError> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        self.calls.lock().unwrap().insert(peer_id, calls.clone());
        self.connect_order.lock().unwrap().push(peer_id);
        self.event_txs.lock().unwrap().insert(peer_id, events);
        Ok(Box::new(MockTransport { peer_id, calls }))
    }
}
