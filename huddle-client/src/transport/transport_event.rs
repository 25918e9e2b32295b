use huddle_core::{CandidateInit, PeerId};
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Events a peer transport feeds back into the session loop.
pub enum TransportEvent {
    /// Trickle ICE: a local candidate to relay to the remote peer.
    CandidateGenerated(PeerId, CandidateInit),
    /// The negotiation primitive reports end-to-end connectivity.
    Connected(PeerId),
    /// The connection failed or was closed remotely.
    Disconnected(PeerId),
    /// Remote media arrived for this peer.
    RemoteTrack(PeerId, Arc<TrackRemote>),
}
