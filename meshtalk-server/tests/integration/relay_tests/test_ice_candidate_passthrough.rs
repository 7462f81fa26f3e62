use meshtalk_core::{IceCandidatePayload, PeerId, ServerMessage};
use meshtalk_server::RelayCommand;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{barrier, join};

#[tokio::test]
async fn test_ice_candidate_passthrough() {
    init_tracing();

    let (cmd_tx, mock) = create_test_relay();

    let alice = PeerId::new();
    let bob = PeerId::new();
    join(&cmd_tx, &mock, &alice, "team-sync", "alice").await;
    join(&cmd_tx, &mock, &bob, "team-sync", "bob").await;

    let candidate = IceCandidatePayload {
        sdp_m_line_index: Some(1),
        candidate: "candidate:0 1 UDP 2122252543 192.0.2.1 54400 typ host".to_owned(),
    };
    cmd_tx
        .send(RelayCommand::IceCandidate {
            from: alice.clone(),
            to: bob.clone(),
            candidate: candidate.clone(),
        })
        .await
        .unwrap();
    barrier(&cmd_tx, &mock).await;

    let forwarded: Vec<_> = mock
        .sent_to(&bob)
        .await
        .into_iter()
        .filter_map(|msg| match msg {
            ServerMessage::IceCandidate { peer_id, candidate } => Some((peer_id, candidate)),
            _ => None,
        })
        .collect();

    assert_eq!(forwarded, vec![(alice, candidate)]);
}
