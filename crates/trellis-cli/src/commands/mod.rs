pub mod check;
pub mod render;
pub mod serve;

use anyhow::{Context, Result};
use std::path::Path;
use trellis_config::{RenderConfig, StyleConfig};
use trellis_core::{
    BinderOptions, CacheConfig, Palette, Screen, SessionOptions, StyleResolver, VersionGate,
};

pub(crate) fn version_gate(config: &RenderConfig) -> VersionGate {
    let gate = VersionGate::new(config.max_supported_version);
    match config.min_supported_version {
        Some(min) => gate.with_minimum(min),
        None => gate,
    }
}

pub(crate) fn session_options(config: &RenderConfig) -> SessionOptions {
    SessionOptions {
        gate: version_gate(config),
        binder: BinderOptions {
            max_depth: config.max_depth,
            default_collection: config.default_collection.clone(),
        },
        cache: CacheConfig {
            capacity: config.cache_capacity,
        },
    }
}

/// Default palette with the configured overrides applied.
pub(crate) fn style_resolver(config: &StyleConfig) -> Result<StyleResolver> {
    let mut palette = Palette::default();
    palette
        .apply_overrides(&config.palette)
        .context("invalid [style.palette] entry")?;
    Ok(StyleResolver::new(palette))
}

pub(crate) fn read_screen(path: &Path) -> Result<std::result::Result<Screen, serde_json::Error>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Screen::from_json(&json))
}
