use huddle_core::{PeerDescriptor, PeerId, RoomId, SignalKind, SignalMessage};

use crate::init_tracing;
use crate::utils::{SessionHarness, wait_until};

#[tokio::test]
async fn test_room_joined_in_room_is_discarded() {
    init_tracing();

    let harness = SessionHarness::spawn();
    let alice = PeerId::new();
    harness
        .join_room("demo", &[(alice, "alice")])
        .await
        .expect("join failed");

    let transports = harness.transports.clone();
    assert!(wait_until(|| transports.connect_count() == 1).await);

    // A second admission while already in a room must not rebuild anything.
    let intruder = PeerId::new();
    harness
        .inbound
        .send(SignalMessage::broadcast(SignalKind::RoomJoined {
            room: RoomId::from("other"),
            peers: vec![PeerDescriptor {
                id: intruder,
                username: "intruder".to_owned(),
            }],
        }))
        .await
        .expect("send failed");

    // Drain the queue with a valid follow-up.
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
    assert!(wait_until(|| transports.connect_count() == 2).await);

    assert!(harness.transports.calls_for(intruder).is_empty());
    assert!(harness.signaling.offers_to(intruder).is_empty());
}
