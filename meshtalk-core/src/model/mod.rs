mod channel;
mod control;
mod media;
mod peer;
mod signaling;
mod user_data;

pub use channel::{ChannelName, ChannelNameError};
pub use control::{ChatLog, ControlMessage, OutboundHalf, outbound_half};
pub use media::MediaKind;
pub use peer::PeerId;
pub use signaling::{
    ClientMessage, IceCandidatePayload, IceServerConfig, SdpKind, ServerMessage, SessionDescription,
};
pub use user_data::UserData;
