pub use meshtalk_core::model::PeerId;

pub mod model {
    pub use meshtalk_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use meshtalk_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use meshtalk_client::*;
}
