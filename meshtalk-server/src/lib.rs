pub mod registry;
pub mod relay;
pub mod signaling;

pub use registry::{ChannelRegistry, Joined};
pub use relay::{Relay, RelayCommand};
pub use signaling::{SignalingOutput, SignalingService, ws_handler};
