pub mod model;
pub mod negotiation;
pub mod talking;
pub mod tracks;
pub mod utils;

pub use model::{
    ChannelName, ChannelNameError, ChatLog, ClientMessage, ControlMessage, IceCandidatePayload,
    IceServerConfig, MediaKind, OutboundHalf, PeerId, SdpKind, ServerMessage, SessionDescription,
    UserData, outbound_half,
};
