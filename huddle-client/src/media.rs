use crate::error::MediaError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use webrtc::track::track_local::TrackLocal;

/// The local capture handle shared by every peer connection in a session.
/// Cloning shares the underlying tracks.
#[derive(Clone, Default)]
pub struct LocalMedia {
    pub tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

/// Where local audio/video actually comes from. Hardware capture is the
/// embedder's concern; tests plug in sources that count, stall or deny.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<LocalMedia, MediaError>;

    /// Stop capture. Called once per successful `acquire`, when the last
    /// peer connection detaches.
    async fn release(&self);
}

/// Source over tracks the application already owns (file playback,
/// synthesized audio). Acquisition never fails and release is a no-op.
pub struct StaticMediaSource {
    media: LocalMedia,
}

impl StaticMediaSource {
    pub fn new(tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>) -> Self {
        Self {
            media: LocalMedia { tracks },
        }
    }
}

#[async_trait]
impl MediaSource for StaticMediaSource {
    async fn acquire(&self) -> Result<LocalMedia, MediaError> {
        Ok(self.media.clone())
    }

    async fn release(&self) {}
}

#[derive(Default)]
struct MediaState {
    media: Option<LocalMedia>,
    refs: usize,
    denied: Option<String>,
}

/// Ref-counted owner of the single local capture. At most one acquisition is
/// ever in flight; overlapping `ensure_local` calls all wait on it instead of
/// issuing a second hardware request.
pub struct MediaManager {
    source: Arc<dyn MediaSource>,
    state: Mutex<MediaState>,
}

impl MediaManager {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self {
            source,
            state: Mutex::new(MediaState::default()),
        }
    }

    /// Acquire (or join) the local stream and take a reference on it.
    ///
    /// A denial is remembered and returned to every later caller until
    /// [`MediaManager::reset`], so a burst of peer arrivals cannot re-prompt
    /// the user.
    pub async fn ensure_local(&self) -> Result<LocalMedia, MediaError> {
        // The lock is held across `acquire`, which is what serializes
        // overlapping callers onto one hardware request.
        let mut state = self.state.lock().await;

        if let Some(reason) = &state.denied {
            return Err(MediaError::AcquisitionDenied(reason.clone()));
        }

        let media = match &state.media {
            Some(media) => media.clone(),
            None => match self.source.acquire().await {
                Ok(media) => {
                    info!(tracks = media.tracks.len(), "local media acquired");
                    state.media = Some(media.clone());
                    media
                }
                Err(error) => {
                    if let MediaError::AcquisitionDenied(reason) = &error {
                        state.denied = Some(reason.clone());
                    }
                    return Err(error);
                }
            },
        };

        state.refs += 1;
        Ok(media)
    }

    /// Drop one reference; stops capture when the count reaches zero.
    pub async fn release(&self) {
        let mut state = self.state.lock().await;
        if state.refs == 0 {
            return;
        }
        state.refs -= 1;
        if state.refs == 0 && state.media.take().is_some() {
            debug!("last peer connection detached, stopping capture");
            self.source.release().await;
        }
    }

    /// Forget a remembered denial so an explicit user retry can prompt again.
    pub async fn reset(&self) {
        self.state.lock().await.denied = None;
    }

    pub async fn refs(&self) -> usize {
        self.state.lock().await.refs
    }
}
