use meshtalk_core::{ChannelName, IceCandidatePayload, PeerId, SessionDescription, UserData};

/// Commands entering the relay loop from the WebSocket front end. Channel
/// names are validated before a command is built, so the relay itself never
/// sees an invalid one.
#[derive(Debug)]
pub enum RelayCommand {
    /// A connection wants to join a channel.
    Join {
        peer_id: PeerId,
        channel: ChannelName,
        user_data: UserData,
    },

    /// Forward an offer or answer to `to`, re-addressed as coming from
    /// `from`. Content-blind pass-through.
    SessionDescription {
        from: PeerId,
        to: PeerId,
        sdp: SessionDescription,
    },

    /// Forward an ICE candidate, same addressing as above.
    IceCandidate {
        from: PeerId,
        to: PeerId,
        candidate: IceCandidatePayload,
    },

    /// Mutate the caller's own user-data entry in one channel.
    UpdateUserData {
        peer_id: PeerId,
        channel: ChannelName,
        key: String,
        value: serde_json::Value,
    },

    /// The transport connection closed.
    Disconnect { peer_id: PeerId },
}
