use meshtalk_core::PeerId;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{disconnect, join};

/// Disconnect cleanup runs from both perspectives: every remaining member is
/// told to forget the departing peer, and the departing side is told to
/// forget each of them.
#[tokio::test]
async fn test_disconnect_notifies_both_sides() {
    init_tracing();

    let (cmd_tx, mock) = create_test_relay();

    let alice = PeerId::new();
    let bob = PeerId::new();
    let carol = PeerId::new();
    join(&cmd_tx, &mock, &alice, "team-sync", "alice").await;
    join(&cmd_tx, &mock, &bob, "team-sync", "bob").await;
    join(&cmd_tx, &mock, &carol, "team-sync", "carol").await;

    disconnect(&cmd_tx, &mock, &alice).await;

    assert_eq!(mock.remove_peers_for(&bob).await, vec![alice.clone()]);
    assert_eq!(mock.remove_peers_for(&carol).await, vec![alice.clone()]);

    let mut told_to_alice = mock.remove_peers_for(&alice).await;
    told_to_alice.sort_by_key(|p| p.to_string());
    let mut expected = vec![bob.clone(), carol.clone()];
    expected.sort_by_key(|p| p.to_string());
    assert_eq!(told_to_alice, expected);

    // Bob and carol keep their mutual link: no removal names either of them.
    assert!(!mock.remove_peers_for(&bob).await.contains(&carol));
    assert!(!mock.remove_peers_for(&carol).await.contains(&bob));
}
