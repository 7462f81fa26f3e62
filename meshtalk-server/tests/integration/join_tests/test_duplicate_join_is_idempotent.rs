use meshtalk_core::PeerId;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::join;

#[tokio::test]
async fn test_duplicate_join_is_idempotent() {
    init_tracing();

    let (cmd_tx, mock) = create_test_relay();

    let alice = PeerId::new();
    let bob = PeerId::new();

    join(&cmd_tx, &mock, &alice, "team-sync", "alice").await;
    join(&cmd_tx, &mock, &alice, "team-sync", "alice").await;
    join(&cmd_tx, &mock, &bob, "team-sync", "bob").await;

    // Had the duplicate join registered twice, bob would have been announced
    // two alice entries and a three-member map.
    let bob_adds = mock.add_peers_for(&bob).await;
    assert_eq!(bob_adds.len(), 1);
    assert_eq!(bob_adds[0].2, 2, "member count must not grow on re-join");

    // The duplicate must not re-announce anything to alice either.
    assert_eq!(mock.add_peers_for(&alice).await.len(), 1);
}
