pub mod engine;
pub mod logger;
pub mod talking;
pub mod tracks;

pub use engine::{MeshConfig, MeshEngine, MeshEvent};
pub use logger::Logger;
