use crate::utils::MockSignalingOutput;
use meshtalk_core::{ChannelName, IceCandidatePayload, PeerId, UserData};
use meshtalk_server::RelayCommand;
use tokio::sync::mpsc;

pub fn channel(name: &str) -> ChannelName {
    ChannelName::parse(name).expect("valid channel name")
}

pub fn user(name: &str) -> UserData {
    UserData::new(name, "test-agent")
}

/// Send a join for `peer` and wait until the relay has fully handled it, so
/// later assertions observe a settled registry.
pub async fn join(
    cmd_tx: &mpsc::Sender<RelayCommand>,
    mock: &MockSignalingOutput,
    peer: &PeerId,
    chan: &str,
    display_name: &str,
) {
    cmd_tx
        .send(RelayCommand::Join {
            peer_id: peer.clone(),
            channel: channel(chan),
            user_data: user(display_name),
        })
        .await
        .expect("relay alive");
    barrier(cmd_tx, mock).await;
}

pub async fn disconnect(
    cmd_tx: &mpsc::Sender<RelayCommand>,
    mock: &MockSignalingOutput,
    peer: &PeerId,
) {
    cmd_tx
        .send(RelayCommand::Disconnect {
            peer_id: peer.clone(),
        })
        .await
        .expect("relay alive");
    barrier(cmd_tx, mock).await;
}

/// The relay handles commands in order on a single task, so once a probe
/// command's output is visible, everything sent before it has been fully
/// processed. The probe is an ICE relay to a fresh peer id, which the relay
/// forwards unconditionally.
pub async fn barrier(cmd_tx: &mpsc::Sender<RelayCommand>, mock: &MockSignalingOutput) {
    let probe = PeerId::new();
    cmd_tx
        .send(RelayCommand::IceCandidate {
            from: probe.clone(),
            to: probe.clone(),
            candidate: IceCandidatePayload {
                sdp_m_line_index: None,
                candidate: "barrier".to_owned(),
            },
        })
        .await
        .expect("relay alive");

    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(1000);
    loop {
        if !mock.sent_to(&probe).await.is_empty() {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("relay did not drain its command queue");
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}

/// Assert the glare rule for one pair: exactly one side was told to offer.
pub async fn assert_one_offerer(mock: &MockSignalingOutput, a: &PeerId, b: &PeerId) {
    let a_sees_b = mock
        .add_peers_for(a)
        .await
        .into_iter()
        .find(|(id, _, _)| id == b)
        .expect("a was told about b");
    let b_sees_a = mock
        .add_peers_for(b)
        .await
        .into_iter()
        .find(|(id, _, _)| id == a)
        .expect("b was told about a");

    assert_ne!(
        a_sees_b.1, b_sees_a.1,
        "exactly one side of a pair may hold the offerer role"
    );
}
