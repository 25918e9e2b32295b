pub mod error;
pub mod media;
pub mod peer;
pub mod session;
pub mod signaling;
pub mod transport;

pub use error::{MediaError, SessionError, TransportError};
pub use media::{LocalMedia, MediaManager, MediaSource, StaticMediaSource};
pub use peer::{NegotiationState, PeerConnectionManager, Role};
pub use session::{
    NoopBehavior, RoomMembership, RoomSession, SessionBehavior, SessionCommand, SessionState,
};
pub use signaling::SignalingChannel;
pub use transport::{
    PeerTransport, RtcTransport, RtcTransportFactory, TransportConfig, TransportEvent,
    TransportFactory,
};
