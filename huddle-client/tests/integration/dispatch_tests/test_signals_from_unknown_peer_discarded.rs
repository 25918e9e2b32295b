use huddle_core::{CandidateInit, PeerId, SignalKind};

use crate::init_tracing;
use crate::utils::{SessionHarness, wait_until};

#[tokio::test]
async fn test_signals_from_unknown_peer_discarded() {
    init_tracing();

    let harness = SessionHarness::spawn();
    let alice = PeerId::new();
    harness
        .join_room("demo", &[(alice, "alice")])
        .await
        .expect("join failed");

    let transports = harness.transports.clone();
    assert!(wait_until(|| transports.connect_count() == 1).await);

    // A peer that was never announced sends SDP and candidates.
    let stranger = PeerId::new();
    harness
        .send_from(
            stranger,
            SignalKind::Offer {
                sdp: "stray-offer".to_owned(),
            },
        )
        .await
        .expect("send failed");
    harness
        .send_from(
            stranger,
            SignalKind::Answer {
                sdp: "stray-answer".to_owned(),
            },
        )
        .await
        .expect("send failed");
    harness
        .send_from(
            stranger,
            SignalKind::IceCandidate {
                candidate: CandidateInit {
                    candidate: "stray-candidate".to_owned(),
                    sdp_mid: None,
                    sdp_m_line_index: None,
                },
            },
        )
        .await
        .expect("send failed");

    // Prove the loop processed all three by pushing one more valid message.
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

    // None of the stray signals reached a transport or produced a reply.
    assert!(harness.transports.calls_for(stranger).is_empty());
    assert!(harness.signaling.answers_to(stranger).is_empty());
}
