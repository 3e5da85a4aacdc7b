//! Interpreter limits: accepted document versions, depth bound and cache size.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Highest document format version this build understands
    pub max_supported_version: u32,
    /// Optional floor; documents below it are rejected too
    pub min_supported_version: Option<u32>,
    pub max_depth: usize,
    /// Collection a list without an explicit key binds to
    pub default_collection: String,
    /// Maximum resolved rows kept by the view cache
    pub cache_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_supported_version: 1,
            min_supported_version: None,
            max_depth: 64,
            default_collection: "jobs".to_string(),
            cache_capacity: 512,
        }
    }
}
