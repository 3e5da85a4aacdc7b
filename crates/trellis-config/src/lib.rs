//! Trellis configuration
//!
//! Typed configuration for the screen server, the rendering client and the
//! `trellis` binary, loaded from TOML with `TRELLIS_*` environment overrides.
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [render]
//! max_supported_version = 1
//!
//! [style.palette]
//! accent = "#FF8800"
//! ```

pub mod components;
pub mod error;
pub mod loader;

pub use components::{ClientConfig, LogFormat, LoggingConfig, RenderConfig, ServerConfig, StyleConfig};
pub use error::{ConfigError, Result};
pub use loader::{TrellisConfig, ENV_DATA, ENV_HOST, ENV_LOG, ENV_PORT};
