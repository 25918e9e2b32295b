use async_trait::async_trait;
use huddle_core::SignalMessage;

/// Outbound half of the rendezvous transport. The session emits offers,
/// answers, candidates and room requests through this seam; inbound delivery
/// and channel closure are modeled as the `mpsc::Receiver` fed to
/// [`crate::RoomSession::run`].
///
/// Delivery failures are the channel's problem to log; the session never
/// retries a send.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    async fn send(&self, message: SignalMessage);
}
