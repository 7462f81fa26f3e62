use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

/// Application message carried peer-to-peer over a link's data channel.
/// Immutable once built; `date` is an ISO-8601 timestamp set by the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ControlMessage {
    /// The sender asserts a new display name. Presentation state only; the
    /// registry is not involved.
    Rename {
        name: String,
        peer_id: PeerId,
        message: String,
        date: String,
    },
    Chat {
        name: String,
        peer_id: PeerId,
        message: String,
        date: String,
    },
}

impl ControlMessage {
    pub fn sender(&self) -> &PeerId {
        match self {
            ControlMessage::Rename { peer_id, .. } | ControlMessage::Chat { peer_id, .. } => {
                peer_id
            }
        }
    }
}

/// Which of a link's data-channel pair carries an outbound control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundHalf {
    /// The channel this side created.
    Local,
    /// The channel the peer opened toward us.
    Remote,
}

/// Pick the channel to send on: the locally created one when open, the
/// remote-initiated one as fallback while ours is still connecting. A link
/// with neither open gets nothing, a link with any open gets exactly one
/// delivery.
pub fn outbound_half(local_open: bool, remote_open: bool) -> Option<OutboundHalf> {
    if local_open {
        Some(OutboundHalf::Local)
    } else if remote_open {
        Some(OutboundHalf::Remote)
    } else {
        None
    }
}

/// Ordered, append-only chat history. Local to each client; a member who
/// joins late sees no prior entries.
#[derive(Debug, Default, Clone)]
pub struct ChatLog {
    entries: Vec<ControlMessage>,
}

impl ChatLog {
    pub fn push(&mut self, msg: ControlMessage) {
        self.entries.push(msg);
    }

    pub fn entries(&self) -> &[ControlMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
