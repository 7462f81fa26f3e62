use crate::model::IceServerConfig;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_TURN_ADDR: &str = "turn:openrelay.metered.ca:443";
pub const DEFAULT_TURN_USERNAME: &str = "openrelayproject";
pub const DEFAULT_TURN_CREDENTIAL: &str = "openrelayproject";

/// Public STUN plus the open relay TURN fallback, used when the embedder
/// supplies no ICE configuration of its own.
pub fn default_ice_servers() -> Vec<IceServerConfig> {
    vec![
        IceServerConfig {
            urls: vec![DEFAULT_STUN_ADDR.to_owned()],
            username: None,
            credential: None,
        },
        IceServerConfig {
            urls: vec![DEFAULT_TURN_ADDR.to_owned()],
            username: Some(DEFAULT_TURN_USERNAME.to_owned()),
            credential: Some(DEFAULT_TURN_CREDENTIAL.to_owned()),
        },
    ]
}
