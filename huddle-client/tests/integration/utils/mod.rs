pub mod mock_media;
pub mod mock_transport;

pub use mock_media::*;
pub use mock_signaling::*;
pub use mock_transport::*;
pub use session_harness::*;

use std::time::Duration;
use tokio::time::Instant;

/// Poll `cond` until it holds or a 2s deadline passes. The session loop is
/// asynchronous, so assertions wait for it to settle instead of racing it.
pub async fn wait_until<F: Fn() -> bool>(cond: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
