pub mod config;
pub mod error;
pub mod events;
pub mod loader;
pub mod progress;
pub mod service;
pub mod processing {
    pub mod cache;
    pub mod codec;
    pub mod path_policy;
}
pub mod tasks {
    pub mod driver;
    pub mod pipeline;
    pub mod queue;
}

pub use config::Configuration;
pub use error::Error;
pub use service::{CompressionService, TextureCompressor};
