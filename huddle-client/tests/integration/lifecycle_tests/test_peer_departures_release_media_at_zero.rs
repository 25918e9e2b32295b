use huddle_core::{PeerId, SignalKind};

use crate::init_tracing;
use crate::utils::{BehaviorEvent, SessionHarness, wait_until};

#[tokio::test]
async fn test_peer_departures_release_media_at_zero() {
    init_tracing();

    let harness = SessionHarness::spawn();
    let alice = PeerId::new();
    let bob = PeerId::new();
    harness
        .join_room("demo", &[(alice, "alice"), (bob, "bob")])
        .await
        .expect("join failed");

    let transports = harness.transports.clone();
    assert!(wait_until(|| transports.connect_count() == 2).await);

    // First departure drops a reference but capture keeps running.
    harness
        .send_from(alice, SignalKind::PeerLeft)
        .await
        .expect("send failed");
    assert!(wait_until(|| transports.was_closed(alice)).await);
    assert_eq!(harness.media.released(), 0);

    // Last departure stops capture.
    harness
        .send_from(bob, SignalKind::PeerLeft)
        .await
        .expect("send failed");
    assert!(wait_until(|| transports.was_closed(bob)).await);

    let media = harness.media.clone();
    assert!(
        wait_until(|| media.released() == 1).await,
        "capture must stop when the last connection goes away"
    );
    assert!(harness.behavior.contains(&BehaviorEvent::PeerLeft(alice)));
    assert!(harness.behavior.contains(&BehaviorEvent::PeerLeft(bob)));

    // The room is empty but we are still in it; a newcomer re-acquires.
    let carol = PeerId::new();
    harness
        .send_from(
            carol,
            SignalKind::NewPeer {
                username: "carol".to_owned(),
            },
        )
        .await
        .expect("send failed");
    assert!(wait_until(|| transports.connect_count() == 3).await);
    assert_eq!(harness.media.acquired(), 2);
}
