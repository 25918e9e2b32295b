use crate::error::SessionError;
use async_trait::async_trait;
use huddle_core::{PeerDescriptor, PeerId, RoomId};
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Hooks the embedding application implements to observe the session: room
/// admission, peer connectivity, remote media. All methods default to
/// no-ops so callers implement only what they render.
#[async_trait]
pub trait SessionBehavior: Send + Sync + 'static {
    async fn on_room_joined(&self, _room_id: &RoomId, _peers: &[PeerDescriptor]) {}

    /// Admission failed after the server accepted us, e.g. the user denied
    /// camera access. The signaling connection stays open; a new Join may be
    /// issued.
    async fn on_join_failed(&self, _error: &SessionError) {}

    async fn on_peer_connected(&self, _peer_id: PeerId) {}

    async fn on_peer_left(&self, _peer_id: PeerId) {}

    async fn on_remote_track(&self, _peer_id: PeerId, _track: Arc<TrackRemote>) {}

    /// The session is gone: user left or the signaling channel closed.
    async fn on_closed(&self) {}
}

/// Behavior for embedders that only poll state.
pub struct NoopBehavior;

#[async_trait]
impl SessionBehavior for NoopBehavior {}
