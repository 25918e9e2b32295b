use async_trait::async_trait;
use huddle_client::{LocalMedia, MediaError, MediaSource};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Media source that counts hardware requests and can stall or deny them.
#[derive(Default)]
pub struct CountingMediaSource {
    attempts: AtomicUsize,
    acquired: AtomicUsize,
    released: AtomicUsize,
    deny: AtomicBool,
    delay_ms: AtomicUsize,
}

impl CountingMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        let source = Self::default();
        source.deny.store(true, Ordering::SeqCst);
        source
    }

    pub fn slow(delay: Duration) -> Self {
        let source = Self::default();
        source.delay_ms.store(delay.as_millis() as usize, Ordering::SeqCst);
        source
    }

    pub fn set_deny(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }

    /// Hardware requests issued, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for CountingMediaSource {
    async fn acquire(&self) -> Result<LocalMedia, MediaError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }

        if self.deny.load(Ordering::SeqCst) {
            return Err(MediaError::AcquisitionDenied("denied by test".to_owned()));
        }

        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(LocalMedia::default())
    }

    async fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
