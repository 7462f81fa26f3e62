use meshtalk_core::PeerId;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{assert_one_offerer, join};

/// The later joiner is told to create the offer, the earlier member waits
/// for it.
#[tokio::test]
async fn test_join_assigns_offerer_roles() {
    init_tracing();

    let (cmd_tx, mock) = create_test_relay();

    let alice = PeerId::new();
    let bob = PeerId::new();

    join(&cmd_tx, &mock, &alice, "team-sync", "alice").await;
    join(&cmd_tx, &mock, &bob, "team-sync", "bob").await;

    let alice_adds = mock.add_peers_for(&alice).await;
    let bob_adds = mock.add_peers_for(&bob).await;

    assert_eq!(alice_adds.len(), 1);
    assert_eq!(bob_adds.len(), 1);

    let (announced, should_offer, member_count) = &alice_adds[0];
    assert_eq!(announced, &bob);
    assert!(!should_offer, "the earlier member must wait for the offer");
    assert_eq!(*member_count, 2);

    let (announced, should_offer, member_count) = &bob_adds[0];
    assert_eq!(announced, &alice);
    assert!(*should_offer, "the later joiner must create the offer");
    assert_eq!(*member_count, 2);

    assert_one_offerer(&mock, &alice, &bob).await;
}
