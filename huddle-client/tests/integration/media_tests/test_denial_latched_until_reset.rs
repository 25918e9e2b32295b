use std::sync::Arc;

use huddle_client::{MediaError, MediaManager};

use crate::init_tracing;
use crate::utils::CountingMediaSource;

#[tokio::test]
async fn test_denial_latched_until_reset() {
    init_tracing();

    let source = Arc::new(CountingMediaSource::denying());
    let manager = MediaManager::new(source.clone());

    let denied = manager.ensure_local().await;
    assert!(matches!(denied, Err(MediaError::AcquisitionDenied(_))));
    assert_eq!(source.attempts(), 1);

    // Until the user explicitly retries, the denial is remembered and the
    // device is not prompted again.
    source.set_deny(false);
    let still_denied = manager.ensure_local().await;
    assert!(matches!(
        still_denied,
        Err(MediaError::AcquisitionDenied(_))
    ));
    assert_eq!(source.attempts(), 1, "latched denial must not re-prompt");

    manager.reset().await;
    manager
        .ensure_local()
        .await
        .expect("acquisition after reset failed");
    assert_eq!(source.attempts(), 2);
    assert_eq!(source.acquired(), 1);
    assert_eq!(manager.refs().await, 1);

    // Reference counting: the device is released only at zero.
    manager.ensure_local().await.expect("second reference failed");
    assert_eq!(source.attempts(), 2);
    manager.release().await;
    assert_eq!(source.released(), 0);
    manager.release().await;
    assert_eq!(source.released(), 1);
    assert_eq!(manager.refs().await, 0);
}
