use huddle_core::PeerId;
use thiserror::Error;

/// Local capture failures.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The user or platform refused capture. Not retried until the user
    /// explicitly asks again.
    #[error("media acquisition denied: {0}")]
    AcquisitionDenied(String),

    #[error("capture device failure: {0}")]
    Device(String),
}

/// Failures of the underlying negotiation primitive.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Rtc(#[from] webrtc::Error),

    #[error("transport closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// A peer connection entry already exists for this peer id.
    #[error("peer connection already exists for {0}")]
    DuplicatePeer(PeerId),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
