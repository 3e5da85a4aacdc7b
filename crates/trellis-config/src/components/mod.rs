//! Configuration sections
//!
//! One module per `[section]` of `config.toml`. Every section has a usable
//! `Default` so a missing file or a partial file still loads.

pub mod client;
pub mod logging;
pub mod render;
pub mod server;
pub mod style;

pub use client::ClientConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use render::RenderConfig;
pub use server::ServerConfig;
pub use style::StyleConfig;
