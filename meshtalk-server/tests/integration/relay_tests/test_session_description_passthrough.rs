use meshtalk_core::{PeerId, SdpKind, ServerMessage, SessionDescription};
use meshtalk_server::RelayCommand;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{barrier, join};

/// The relay forwards descriptions unchanged, re-addressed with the sender's
/// id. It never parses the SDP body.
#[tokio::test]
async fn test_session_description_passthrough() {
    init_tracing();

    let (cmd_tx, mock) = create_test_relay();

    let alice = PeerId::new();
    let bob = PeerId::new();
    join(&cmd_tx, &mock, &alice, "team-sync", "alice").await;
    join(&cmd_tx, &mock, &bob, "team-sync", "bob").await;

    let sdp = SessionDescription {
        kind: SdpKind::Offer,
        body: "v=0\r\nnot even valid sdp, relays anyway".to_owned(),
    };
    cmd_tx
        .send(RelayCommand::SessionDescription {
            from: bob.clone(),
            to: alice.clone(),
            sdp: sdp.clone(),
        })
        .await
        .unwrap();
    barrier(&cmd_tx, &mock).await;

    let forwarded: Vec<_> = mock
        .sent_to(&alice)
        .await
        .into_iter()
        .filter_map(|msg| match msg {
            ServerMessage::SessionDescription { peer_id, sdp } => Some((peer_id, sdp)),
            _ => None,
        })
        .collect();

    assert_eq!(forwarded, vec![(bob, sdp)]);
    // Nothing echoes back to the sender.
    assert!(
        !mock
            .sent_to(&bob)
            .await
            .iter()
            .any(|msg| matches!(msg, ServerMessage::SessionDescription { .. }))
    );
}
