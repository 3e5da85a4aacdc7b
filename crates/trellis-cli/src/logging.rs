//! Subscriber setup
//!
//! `RUST_LOG` wins over everything. Otherwise the command-line level, then
//! `[logging] level` from config. Output goes to stderr so `render --format
//! json` stays pipeable.

use anyhow::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use trellis_config::{LogFormat, LoggingConfig};

pub fn init_logging(config: &LoggingConfig, level_override: Option<LevelFilter>) -> Result<()> {
    let filter = build_filter(config, level_override)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

fn build_filter(config: &LoggingConfig, level_override: Option<LevelFilter>) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(EnvFilter::from_default_env());
    }
    let directive = match level_override {
        Some(level) => level.to_string().to_lowercase(),
        None => config.level.clone(),
    };
    EnvFilter::try_new(&directive)
        .map_err(|e| anyhow::anyhow!("Invalid log level '{directive}': {e}"))
}
