use async_trait::async_trait;
use meshtalk_core::{PeerId, ServerMessage};

/// Outbound seam of the relay. The production implementation writes to the
/// peer's WebSocket; tests substitute a capture.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver one message to a connected peer. Delivery to an unknown or
    /// already-disconnected peer is dropped, not an error.
    async fn send(&self, to: PeerId, msg: ServerMessage);
}
