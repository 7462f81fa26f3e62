use meshtalk_core::PeerId;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{disconnect, join};

/// Once the last member leaves, the channel ceases to exist: a later joiner
/// starts a fresh channel and is announced nobody.
#[tokio::test]
async fn test_empty_channel_is_deleted() {
    init_tracing();

    let (cmd_tx, mock) = create_test_relay();

    let alice = PeerId::new();
    let bob = PeerId::new();
    join(&cmd_tx, &mock, &alice, "team-sync", "alice").await;
    join(&cmd_tx, &mock, &bob, "team-sync", "bob").await;

    disconnect(&cmd_tx, &mock, &alice).await;
    disconnect(&cmd_tx, &mock, &bob).await;

    let dana = PeerId::new();
    join(&cmd_tx, &mock, &dana, "team-sync", "dana").await;

    assert!(
        mock.add_peers_for(&dana).await.is_empty(),
        "a re-created channel must carry no stale members"
    );
}
