pub mod model;

pub use model::{
    CandidateInit, IceServerConfig, PeerDescriptor, PeerId, RoomId, SignalKind, SignalMessage,
};
