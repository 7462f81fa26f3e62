use meshtalk_core::PeerId;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{assert_one_offerer, join};

#[tokio::test]
async fn test_three_members_join() {
    init_tracing();

    let (cmd_tx, mock) = create_test_relay();

    let peers: Vec<PeerId> = (0..3).map(|_| PeerId::new()).collect();

    join(&cmd_tx, &mock, &peers[0], "standup", "one").await;
    join(&cmd_tx, &mock, &peers[1], "standup", "two").await;
    join(&cmd_tx, &mock, &peers[2], "standup", "three").await;

    // The latest joiner offers towards both existing members.
    let third_adds = mock.add_peers_for(&peers[2]).await;
    assert_eq!(third_adds.len(), 2);
    assert!(third_adds.iter().all(|(_, should_offer, _)| *should_offer));

    // Earlier members wait for every later joiner.
    let first_adds = mock.add_peers_for(&peers[0]).await;
    assert_eq!(first_adds.len(), 2);
    assert!(first_adds.iter().all(|(_, should_offer, _)| !should_offer));

    for i in 0..3 {
        for j in (i + 1)..3 {
            assert_one_offerer(&mock, &peers[i], &peers[j]).await;
        }
    }
}
