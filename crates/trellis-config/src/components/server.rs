//! Screen server configuration
//!
//! Bind address, CORS and body limits for `trellis serve`.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub enable_cors: bool,
    pub max_request_size_mb: usize,
    pub request_timeout_seconds: u64,
    /// JSON directory of technicians, routes and jobs. The built-in sample
    /// directory is served when unset.
    pub data_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Socket address to bind, if `bind_address` parses as an IP.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port).parse().ok()
    }

    pub fn max_request_bytes(&self) -> usize {
        self.max_request_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
            max_request_size_mb: 1,
            request_timeout_seconds: 30,
            data_file: None,
        }
    }
}
