use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{PeerDescriptor, PeerId, RoomId, SignalKind, SignalMessage};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

struct ClientEntry {
    tx: mpsc::UnboundedSender<Message>,
    room: Option<RoomId>,
    username: String,
}

struct HubInner {
    clients: DashMap<PeerId, ClientEntry>,
    rooms: DashMap<RoomId, HashSet<PeerId>>,
}

/// Room bookkeeping for the relay: who is connected, who is in which room,
/// and the fanout of roster/membership messages. Holds no media or SDP
/// state; it only moves envelopes.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                clients: DashMap::new(),
                rooms: DashMap::new(),
            }),
        }
    }

    /// Register a fresh connection, assign its identity and send `init`.
    pub fn register(&self, tx: mpsc::UnboundedSender<Message>) -> PeerId {
        let peer_id = PeerId::new();
        self.inner.clients.insert(
            peer_id,
            ClientEntry {
                tx,
                room: None,
                username: String::new(),
            },
        );
        self.send_to(
            peer_id,
            SignalMessage::broadcast(SignalKind::Init { client_id: peer_id }),
        );
        info!(peer = %peer_id, "client registered");
        peer_id
    }

    /// Admit a client to a room: reply with the current roster and announce
    /// the newcomer to everyone already there.
    pub fn join(&self, peer_id: PeerId, room_id: RoomId, username: String) {
        {
            let Some(mut client) = self.inner.clients.get_mut(&peer_id) else {
                warn!(peer = %peer_id, "join from unknown client, ignoring");
                return;
            };
            if let Some(previous) = client.room.replace(room_id.clone()) {
                drop(client);
                self.leave_room(peer_id, &previous);
                match self.inner.clients.get_mut(&peer_id) {
                    Some(mut client) => {
                        client.room = Some(room_id.clone());
                        client.username = username.clone();
                    }
                    None => return,
                }
            } else {
                client.username = username.clone();
            }
        }

        let roster = {
            let mut room = self.inner.rooms.entry(room_id.clone()).or_default();
            let roster: Vec<PeerDescriptor> = room
                .iter()
                .filter(|id| **id != peer_id)
                .map(|id| PeerDescriptor {
                    id: *id,
                    username: self
                        .inner
                        .clients
                        .get(id)
                        .map(|c| c.username.clone())
                        .unwrap_or_default(),
                })
                .collect();
            room.insert(peer_id);
            roster
        };

        info!(peer = %peer_id, room = %room_id, %username, "client joined room");

        self.send_to(
            peer_id,
            SignalMessage::broadcast(SignalKind::RoomJoined {
                room: room_id.clone(),
                peers: roster,
            }),
        );
        self.broadcast_to_room(
            &room_id,
            peer_id,
            &SignalMessage::from_peer(peer_id, SignalKind::NewPeer { username }),
        );
    }

    /// Directed forward of offer/answer/candidate. The sender is stamped
    /// here; whatever the client put in its own envelope is not trusted.
    pub fn forward(&self, sender: PeerId, recipient: PeerId, kind: SignalKind) {
        if !self.inner.clients.contains_key(&recipient) {
            debug!(%sender, %recipient, "forward to absent recipient, dropping");
            return;
        }
        let message = SignalMessage {
            sender: Some(sender),
            recipient: Some(recipient),
            kind,
        };
        self.send_to(recipient, message);
    }

    /// Drop a client: remove it from its room, tell the remaining members,
    /// and delete the room once empty.
    pub fn unregister(&self, peer_id: PeerId) {
        let Some((_, entry)) = self.inner.clients.remove(&peer_id) else {
            return;
        };
        if let Some(room_id) = entry.room {
            self.leave_room(peer_id, &room_id);
        }
        info!(peer = %peer_id, "client unregistered");
    }

    fn leave_room(&self, peer_id: PeerId, room_id: &RoomId) {
        let mut emptied = false;
        if let Some(mut room) = self.inner.rooms.get_mut(room_id) {
            room.remove(&peer_id);
            emptied = room.is_empty();
        }
        if emptied {
            self.inner.rooms.remove(room_id);
            debug!(room = %room_id, "room emptied, removed");
        } else {
            self.broadcast_to_room(
                room_id,
                peer_id,
                &SignalMessage::from_peer(peer_id, SignalKind::PeerLeft),
            );
        }
    }

    fn broadcast_to_room(&self, room_id: &RoomId, except: PeerId, message: &SignalMessage) {
        let Some(room) = self.inner.rooms.get(room_id) else {
            return;
        };
        for id in room.iter().filter(|id| **id != except) {
            self.send_to(*id, message.clone());
        }
    }

    fn send_to(&self, peer_id: PeerId, message: SignalMessage) {
        let Some(client) = self.inner.clients.get(&peer_id) else {
            warn!(peer = %peer_id, "attempted to signal a disconnected client");
            return;
        };
        match serde_json::to_string(&message) {
            Ok(json) => {
                if client.tx.send(Message::Text(json.into())).is_err() {
                    warn!(peer = %peer_id, "failed to queue message, connection is closing");
                }
            }
            Err(error) => error!("failed to serialize signal message: {error}"),
        }
    }

    pub fn client_count(&self) -> usize {
        self.inner.clients.len()
    }

    pub fn room_size(&self, room_id: &RoomId) -> usize {
        self.inner
            .rooms
            .get(room_id)
            .map(|room| room.len())
            .unwrap_or(0)
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
