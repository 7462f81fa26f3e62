use async_trait::async_trait;
use meshtalk_server::SignalingOutput;
use meshtalk_core::{PeerId, ServerMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mock SignalingOutput that captures every message the relay emits,
/// addressed by destination peer.
#[derive(Clone)]
pub struct MockSignalingOutput {
    sent: Arc<Mutex<Vec<(PeerId, ServerMessage)>>>,
}

impl MockSignalingOutput {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All messages delivered to `peer`, in emission order.
    pub async fn sent_to(&self, peer: &PeerId) -> Vec<ServerMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(to, _)| to == peer)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    /// The `(peer_id, should_create_offer, member_count)` of every AddPeer
    /// delivered to `peer`.
    pub async fn add_peers_for(&self, peer: &PeerId) -> Vec<(PeerId, bool, usize)> {
        self.sent_to(peer)
            .await
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMessage::AddPeer {
                    peer_id,
                    should_create_offer,
                    members,
                } => Some((peer_id, should_create_offer, members.len())),
                _ => None,
            })
            .collect()
    }

    /// The ids carried by every RemovePeer delivered to `peer`.
    pub async fn remove_peers_for(&self, peer: &PeerId) -> Vec<PeerId> {
        self.sent_to(peer)
            .await
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMessage::RemovePeer { peer_id } => Some(peer_id),
                _ => None,
            })
            .collect()
    }

    pub async fn total_sent(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Poll until at least `count` messages were captured or `timeout_ms`
    /// elapsed. Returns whether the count was reached.
    pub async fn wait_for_sent(&self, count: usize, timeout_ms: u64) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.total_sent().await >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Default for MockSignalingOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, to: PeerId, msg: ServerMessage) {
        tracing::debug!("[MockSignaling] send to {}: {:?}", to, msg);
        self.sent.lock().await.push((to, msg));
    }
}
