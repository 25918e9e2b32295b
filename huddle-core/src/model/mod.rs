mod peer;
mod room;
mod signaling;

pub use peer::{PeerDescriptor, PeerId};
pub use room::RoomId;
pub use signaling::{CandidateInit, IceServerConfig, SignalKind, SignalMessage};
