pub mod mock_signaling;
pub mod relay_helpers;

pub use mock_signaling::*;
pub use relay_helpers::*;
