use crate::error::SessionError;
use crate::media::{MediaManager, MediaSource};
use crate::peer::{PeerConnectionManager, Role};
use crate::session::session_behavior::SessionBehavior;
use crate::session::session_command::SessionCommand;
use crate::signaling::SignalingChannel;
use crate::transport::{TransportEvent, TransportFactory};
use huddle_core::{PeerDescriptor, PeerId, RoomId, SignalKind, SignalMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    ConnectedNoRoom,
    InRoom,
}

pub struct RoomMembership {
    pub room_id: RoomId,
    pub members: HashMap<PeerId, PeerDescriptor>,
}

/// Top-level dispatcher: owns identity, membership and the two managers,
/// and turns the inbound signaling stream into peer-connection lifecycle
/// calls. Handlers run to completion; the only suspension point is media
/// acquisition, during which later messages wait in the inbound channel in
/// arrival order.
pub struct RoomSession {
    state: SessionState,
    client_id: Option<PeerId>,
    membership: Option<RoomMembership>,
    peers: PeerConnectionManager,
    media: Arc<MediaManager>,
    signaling: Arc<dyn SignalingChannel>,
    behavior: Box<dyn SessionBehavior>,
    command_rx: mpsc::Receiver<SessionCommand>,
    inbound_rx: mpsc::Receiver<SignalMessage>,
    transport_rx: mpsc::Receiver<TransportEvent>,
}

impl RoomSession {
    pub fn new(
        behavior: Box<dyn SessionBehavior>,
        signaling: Arc<dyn SignalingChannel>,
        media_source: Arc<dyn MediaSource>,
        transports: Arc<dyn TransportFactory>,
        command_rx: mpsc::Receiver<SessionCommand>,
        inbound_rx: mpsc::Receiver<SignalMessage>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let media = Arc::new(MediaManager::new(media_source));
        let peers = PeerConnectionManager::new(
            signaling.clone(),
            media.clone(),
            transports,
            transport_tx,
        );

        Self {
            state: SessionState::Disconnected,
            client_id: None,
            membership: None,
            peers,
            media,
            signaling,
            behavior,
            command_rx,
            inbound_rx,
            transport_rx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn client_id(&self) -> Option<PeerId> {
        self.client_id
    }

    /// Session event loop. Returns once the session is torn down: user left,
    /// the command handle was dropped, or the signaling channel closed.
    pub async fn run(mut self) {
        info!("room session started");
        self.state = SessionState::ConnectedNoRoom;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd).await {
                                break;
                            }
                        }
                        None => {
                            self.teardown(true).await;
                            break;
                        }
                    }
                }

                msg = self.inbound_rx.recv() => {
                    match msg {
                        Some(msg) => self.dispatch(msg).await,
                        None => {
                            info!("signaling channel closed");
                            self.teardown(false).await;
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    if let Some(evt) = evt {
                        self.handle_transport_event(evt).await;
                    }
                }
            }
        }

        info!("room session finished");
    }

    /// Returns true when the session should exit.
    async fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Join { room_id, username } => {
                if self.state != SessionState::ConnectedNoRoom {
                    warn!(state = ?self.state, "join requested in wrong state, ignoring");
                    return false;
                }
                // An explicit join is the one place a previous capture
                // denial may be retried.
                self.media.reset().await;
                info!(room = %room_id, %username, "requesting to join room");
                self.signaling
                    .send(SignalMessage::broadcast(SignalKind::JoinRoom {
                        room_id,
                        username,
                    }))
                    .await;
                false
            }
            SessionCommand::Leave => {
                self.teardown(true).await;
                true
            }
        }
    }

    async fn dispatch(&mut self, message: SignalMessage) {
        let SignalMessage { sender, kind, .. } = message;

        match kind {
            SignalKind::Init { client_id } => {
                if self.state != SessionState::ConnectedNoRoom || self.client_id.is_some() {
                    warn!(state = ?self.state, "unexpected init, discarding");
                    return;
                }
                info!(%client_id, "identity assigned");
                self.client_id = Some(client_id);
            }

            SignalKind::RoomJoined { room, peers } => {
                self.handle_room_joined(room, peers).await;
            }

            SignalKind::NewPeer { username } => {
                if self.state != SessionState::InRoom {
                    debug!("new-peer while not in a room, discarding");
                    return;
                }
                let Some(peer_id) = sender else {
                    warn!("new-peer without sender, discarding");
                    return;
                };
                self.handle_new_peer(peer_id, username).await;
            }

            SignalKind::PeerLeft => {
                if self.state != SessionState::InRoom {
                    debug!("peer-left while not in a room, discarding");
                    return;
                }
                let Some(peer_id) = sender else {
                    warn!("peer-left without sender, discarding");
                    return;
                };
                self.handle_peer_left(peer_id).await;
            }

            SignalKind::Offer { sdp } => {
                if let Some(peer_id) = self.known_sender(sender) {
                    self.peers.handle_offer(peer_id, sdp).await;
                }
            }

            SignalKind::Answer { sdp } => {
                if let Some(peer_id) = self.known_sender(sender) {
                    self.peers.handle_answer(peer_id, sdp).await;
                }
            }

            SignalKind::IceCandidate { candidate } => {
                if let Some(peer_id) = self.known_sender(sender) {
                    self.peers.handle_candidate(peer_id, candidate).await;
                }
            }

            SignalKind::JoinRoom { .. } | SignalKind::Leave => {
                warn!("client-only message arrived inbound, discarding");
            }

            SignalKind::Unknown => {
                warn!("unknown signaling message kind, discarding");
            }
        }
    }

    /// Validate the sender of an offer/answer/candidate against membership.
    fn known_sender(&self, sender: Option<PeerId>) -> Option<PeerId> {
        if self.state != SessionState::InRoom {
            debug!("signal while not in a room, discarding");
            return None;
        }
        let sender = sender?;
        let known = self
            .membership
            .as_ref()
            .is_some_and(|m| m.members.contains_key(&sender));
        if !known {
            debug!(peer = %sender, "signal from peer outside membership, discarding");
            return None;
        }
        Some(sender)
    }

    async fn handle_room_joined(&mut self, room: RoomId, roster: Vec<PeerDescriptor>) {
        if self.state != SessionState::ConnectedNoRoom {
            warn!(state = ?self.state, "room-joined in wrong state, discarding");
            return;
        }

        info!(room = %room, peers = roster.len(), "admitted to room");
        let members = roster
            .iter()
            .map(|peer| (peer.id, peer.clone()))
            .collect::<HashMap<_, _>>();
        self.membership = Some(RoomMembership {
            room_id: room.clone(),
            members,
        });
        self.state = SessionState::InRoom;

        // Everyone already present is ours to call: we offer, they answer.
        for peer in &roster {
            match self.peers.create(peer.id, &peer.username, Role::Initiator).await {
                Ok(()) => {}
                Err(error @ SessionError::Media(_)) => {
                    self.abort_join(error).await;
                    return;
                }
                Err(error) => {
                    warn!(peer = %peer.id, "failed to set up connection: {error}");
                }
            }
        }

        self.behavior.on_room_joined(&room, &roster).await;
    }

    /// Wind back a partially joined room, e.g. after the user denied
    /// capture. The signaling connection survives so a retry is possible.
    async fn abort_join(&mut self, error: SessionError) {
        warn!("aborting join: {error}");
        self.peers.close_all().await;
        self.membership = None;
        self.state = SessionState::ConnectedNoRoom;
        // Tell the server we are out so the roster stays truthful.
        self.signaling
            .send(SignalMessage::broadcast(SignalKind::Leave))
            .await;
        self.behavior.on_join_failed(&error).await;
    }

    async fn handle_new_peer(&mut self, peer_id: PeerId, username: String) {
        if let Some(membership) = self.membership.as_mut() {
            membership.members.insert(
                peer_id,
                PeerDescriptor {
                    id: peer_id,
                    username: username.clone(),
                },
            );
        }

        // The newcomer initiates; we answer.
        match self.peers.create(peer_id, &username, Role::Answerer).await {
            Ok(()) => info!(peer = %peer_id, %username, "peer arrived"),
            Err(error) => {
                warn!(peer = %peer_id, "failed to prepare connection for new peer: {error}");
            }
        }
    }

    async fn handle_peer_left(&mut self, peer_id: PeerId) {
        let known = self
            .membership
            .as_mut()
            .map(|m| m.members.remove(&peer_id).is_some())
            .unwrap_or(false);
        let closed = self.peers.close(peer_id).await;

        // Absent peer: guaranteed no-op, the protocol can re-deliver.
        if known || closed {
            info!(peer = %peer_id, "peer left");
            self.behavior.on_peer_left(peer_id).await;
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(peer_id, candidate) => {
                self.signaling
                    .send(SignalMessage::to(
                        peer_id,
                        SignalKind::IceCandidate { candidate },
                    ))
                    .await;
            }

            TransportEvent::Connected(peer_id) => {
                if self.peers.mark_connected(peer_id) {
                    self.behavior.on_peer_connected(peer_id).await;
                }
            }

            TransportEvent::Disconnected(peer_id) => {
                // The negotiation primitive gave up on this pair. Drop the
                // entry; the roster entry stays until the server says
                // peer-left.
                if self.peers.close(peer_id).await {
                    warn!(peer = %peer_id, "transport disconnected");
                }
            }

            TransportEvent::RemoteTrack(peer_id, track) => {
                self.behavior.on_remote_track(peer_id, track).await;
            }
        }
    }

    /// Close every entry, release media to zero, clear membership. Nothing
    /// is processed after this starts.
    async fn teardown(&mut self, announce: bool) {
        if announce && self.state != SessionState::Disconnected {
            self.signaling
                .send(SignalMessage::broadcast(SignalKind::Leave))
                .await;
        }
        self.peers.close_all().await;
        self.membership = None;
        self.state = SessionState::Disconnected;
        self.behavior.on_closed().await;
    }
}
