use crate::model::peer::PeerId;
use crate::model::user_data::UserData;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Offer or answer, relayed as-is. The relay never looks at `body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub body: String,
}

/// One ICE network-path descriptor, relayed as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidatePayload {
    pub sdp_m_line_index: Option<u16>,
    pub candidate: String,
}

/// Control messages a client sends to the relay.
///
/// `channel` stays a raw string here; validation happens at the socket
/// boundary so a bad name can be answered with an error instead of a parse
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Join {
        channel: String,
        user_data: UserData,
    },
    RelaySessionDescription {
        peer_id: PeerId,
        sdp: SessionDescription,
    },
    #[serde(rename = "relayICECandidate")]
    RelayIceCandidate {
        peer_id: PeerId,
        candidate: IceCandidatePayload,
    },
    UpdateUserData {
        channel: String,
        key: String,
        value: serde_json::Value,
    },
}

/// Messages the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Sent once per connection: the transport-assigned identity.
    Welcome { peer_id: PeerId },
    /// A member is visible in the channel. `should_create_offer` assigns the
    /// offerer role for this pair: the later joiner offers, the earlier one
    /// waits.
    AddPeer {
        peer_id: PeerId,
        should_create_offer: bool,
        members: HashMap<PeerId, UserData>,
    },
    RemovePeer { peer_id: PeerId },
    SessionDescription {
        peer_id: PeerId,
        sdp: SessionDescription,
    },
    IceCandidate {
        peer_id: PeerId,
        candidate: IceCandidatePayload,
    },
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_uses_camel_case_wire_names() {
        let msg = ClientMessage::Join {
            channel: "team-sync".into(),
            user_data: UserData::new("alice", "firefox"),
        };
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(wire["op"], "join");
        assert_eq!(wire["d"]["channel"], "team-sync");
        assert_eq!(wire["d"]["userData"]["displayName"], "alice");
    }

    #[test]
    fn session_description_round_trips() {
        let msg = ClientMessage::RelaySessionDescription {
            peer_id: PeerId::new(),
            sdp: SessionDescription {
                kind: SdpKind::Offer,
                body: "v=0...".into(),
            },
        };
        let wire = serde_json::to_string(&msg).unwrap();
        assert!(wire.contains("\"relaySessionDescription\""));
        assert!(wire.contains("\"type\":\"offer\""));
        let back: ClientMessage = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn ice_candidate_uses_sdp_m_line_index_name() {
        let msg = ServerMessage::IceCandidate {
            peer_id: PeerId::new(),
            candidate: IceCandidatePayload {
                sdp_m_line_index: Some(0),
                candidate: "candidate:1".into(),
            },
        };
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(wire["op"], "iceCandidate");
        assert_eq!(wire["d"]["candidate"]["sdpMLineIndex"], json!(0));
    }

    #[test]
    fn relayed_ice_keeps_the_uppercase_wire_name() {
        let msg = ClientMessage::RelayIceCandidate {
            peer_id: PeerId::new(),
            candidate: IceCandidatePayload {
                sdp_m_line_index: None,
                candidate: "candidate:1".into(),
            },
        };
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(wire["op"], "relayICECandidate");
    }

    #[test]
    fn add_peer_carries_member_map_and_role_flag() {
        let peer = PeerId::new();
        let msg = ServerMessage::AddPeer {
            peer_id: peer.clone(),
            should_create_offer: true,
            members: HashMap::from([(peer.clone(), UserData::new("bob", "chrome"))]),
        };
        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(wire["d"]["shouldCreateOffer"], true);
        assert_eq!(
            wire["d"]["members"][peer.to_string()]["displayName"],
            "bob"
        );
    }
}
