mod channel_registry;

pub use channel_registry::*;
