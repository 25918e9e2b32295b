mod peer_connection;
mod peer_manager;

pub use peer_connection::{NegotiationState, PeerConnection, Role};
pub use peer_manager::PeerConnectionManager;
