use meshtalk_core::{ChannelName, PeerId, UserData};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Result of a join attempt. Duplicate joins are idempotent and must not
/// grow the member set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joined {
    Added,
    AlreadyMember,
}

/// Authoritative, process-lifetime mapping of channel to member set.
///
/// Concurrency contract: owned exclusively by the relay event-loop task.
/// Every operation is synchronous and completes without yielding, so a
/// read-modify-write never interleaves with another command.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<ChannelName, HashMap<PeerId, UserData>>,
    // Reverse index, consulted on disconnect.
    memberships: HashMap<PeerId, HashSet<ChannelName>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, creating the channel on first join.
    pub fn join(&mut self, channel: ChannelName, peer_id: PeerId, user_data: UserData) -> Joined {
        let members = self.channels.entry(channel.clone()).or_default();
        if members.contains_key(&peer_id) {
            return Joined::AlreadyMember;
        }

        members.insert(peer_id.clone(), user_data);
        self.memberships.entry(peer_id).or_default().insert(channel);
        Joined::Added
    }

    /// Remove a member, deleting the channel when it becomes empty. Returns
    /// whether the member was actually present.
    pub fn leave(&mut self, channel: &ChannelName, peer_id: &PeerId) -> bool {
        let Some(members) = self.channels.get_mut(channel) else {
            return false;
        };
        let removed = members.remove(peer_id).is_some();

        if members.is_empty() {
            self.channels.remove(channel);
            debug!("Channel '{}' is empty, removed", channel);
        }
        if let Some(joined) = self.memberships.get_mut(peer_id) {
            joined.remove(channel);
            if joined.is_empty() {
                self.memberships.remove(peer_id);
            }
        }

        removed
    }

    /// Mutate the caller's own entry. Writes from non-members are rejected
    /// silently; that is benign drift from a racing leave, not a caller bug.
    pub fn update_user_data(
        &mut self,
        channel: &ChannelName,
        peer_id: &PeerId,
        key: &str,
        value: serde_json::Value,
    ) -> bool {
        let Some(data) = self
            .channels
            .get_mut(channel)
            .and_then(|members| members.get_mut(peer_id))
        else {
            debug!("updateUserData from non-member {} ignored", peer_id);
            return false;
        };
        data.set(key, value);
        true
    }

    /// Current member map of a channel, `None` once the channel is gone.
    pub fn snapshot(&self, channel: &ChannelName) -> Option<HashMap<PeerId, UserData>> {
        self.channels.get(channel).cloned()
    }

    /// Channels this connection currently belongs to, for the disconnect
    /// sweep.
    pub fn channels_of(&self, peer_id: &PeerId) -> Vec<ChannelName> {
        self.memberships
            .get(peer_id)
            .map(|joined| joined.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
