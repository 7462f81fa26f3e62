use meshtalk_core::PeerId;
use meshtalk_server::RelayCommand;
use serde_json::json;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{barrier, channel, join};

/// `updateUserData` mutates only the caller's own record. The registry is
/// observed through the member map a later joiner is announced with.
#[tokio::test]
async fn test_update_user_data_self_only() {
    init_tracing();

    let (cmd_tx, mock) = create_test_relay();

    let alice = PeerId::new();
    let bob = PeerId::new();
    join(&cmd_tx, &mock, &alice, "team-sync", "alice").await;
    join(&cmd_tx, &mock, &bob, "team-sync", "bob").await;

    cmd_tx
        .send(RelayCommand::UpdateUserData {
            peer_id: alice.clone(),
            channel: channel("team-sync"),
            key: "displayName".to_owned(),
            value: json!("alicia"),
        })
        .await
        .unwrap();
    // Update from a peer that never joined: silently rejected.
    cmd_tx
        .send(RelayCommand::UpdateUserData {
            peer_id: PeerId::new(),
            channel: channel("team-sync"),
            key: "displayName".to_owned(),
            value: json!("mallory"),
        })
        .await
        .unwrap();
    barrier(&cmd_tx, &mock).await;

    let carol = PeerId::new();
    join(&cmd_tx, &mock, &carol, "team-sync", "carol").await;

    let adds = mock.add_peers_for(&carol).await;
    assert_eq!(adds.len(), 2);

    let members = mock
        .sent_to(&carol)
        .await
        .into_iter()
        .find_map(|msg| match msg {
            meshtalk_core::ServerMessage::AddPeer { members, .. } => Some(members),
            _ => None,
        })
        .expect("carol was announced the member map");

    assert_eq!(members[&alice].display_name, "alicia");
    assert_eq!(members[&bob].display_name, "bob");
}
