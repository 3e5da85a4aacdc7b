//! Loading `config.toml`
//!
//! Resolution order: built-in defaults, then the TOML file, then the
//! `TRELLIS_*` environment variables.

use crate::components::{ClientConfig, LogFormat, LoggingConfig, RenderConfig, ServerConfig, StyleConfig};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_HOST: &str = "TRELLIS_HOST";
pub const ENV_PORT: &str = "TRELLIS_PORT";
pub const ENV_LOG: &str = "TRELLIS_LOG";
pub const ENV_DATA: &str = "TRELLIS_DATA";

/// Complete Trellis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisConfig {
    pub server: ServerConfig,
    pub render: RenderConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
    pub style: StyleConfig,
}

impl TrellisConfig {
    /// `~/.config/trellis/config.toml` (platform config dir)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("trellis")
            .join("config.toml")
    }

    /// Load from `path`, or from [`Self::default_path`] when `None`, then
    /// apply environment overrides.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `TRELLIS_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.bind_address = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid {ENV_PORT}"),
            }
        }
        if let Some(log) = lookup(ENV_LOG) {
            // Either a format name or a level directive
            match log.parse::<LogFormat>() {
                Ok(format) => self.logging.format = format,
                Err(_) => self.logging.level = log,
            }
        }
        if let Some(data) = lookup(ENV_DATA) {
            self.server.data_file = Some(PathBuf::from(data));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "0"));
        }
        if self.render.max_depth == 0 {
            return Err(ConfigError::invalid("render.max_depth", "0"));
        }
        if self.render.cache_capacity == 0 {
            return Err(ConfigError::invalid("render.cache_capacity", "0"));
        }
        if let Some(min) = self.render.min_supported_version {
            if min > self.render.max_supported_version {
                return Err(ConfigError::invalid(
                    "render.min_supported_version",
                    format!("{min} > {}", self.render.max_supported_version),
                ));
            }
        }
        if self.render.default_collection.trim().is_empty() {
            return Err(ConfigError::invalid("render.default_collection", "\"\""));
        }
        if self.client.timeout_seconds == 0 {
            return Err(ConfigError::invalid("client.timeout_seconds", "0"));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level", "\"\""));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = TrellisConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrellisConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config = TrellisConfig::from_toml_str(
            r##"
            [server]
            port = 9090

            [render]
            max_supported_version = 2

            [style.palette]
            accent = "#FF8800"
            "##,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.render.max_supported_version, 2);
        assert_eq!(config.render.default_collection, "jobs");
        assert_eq!(config.style.palette.get("accent").map(String::as_str), Some("#FF8800"));
    }

    #[test]
    fn test_log_format_section() {
        let config = TrellisConfig::from_toml_str("[logging]\nformat = \"json\"\nlevel = \"debug\"").unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_malformed_toml() {
        let err = TrellisConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_wrong_type() {
        let err = TrellisConfig::from_toml_str("[server]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TrellisConfig::default();
        config.apply_overrides_from(env(&[
            (ENV_HOST, "0.0.0.0"),
            (ENV_PORT, "3000"),
            (ENV_LOG, "trellis_web=debug"),
            (ENV_DATA, "/srv/trellis/directory.json"),
        ]));
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "trellis_web=debug");
        assert_eq!(
            config.server.data_file,
            Some(PathBuf::from("/srv/trellis/directory.json"))
        );
    }

    #[test]
    fn test_env_log_format_name() {
        let mut config = TrellisConfig::default();
        config.apply_overrides_from(env(&[(ENV_LOG, "json")]));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_env_port_is_ignored() {
        let mut config = TrellisConfig::default();
        config.apply_overrides_from(env(&[(ENV_PORT, "not-a-port")]));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_version_range() {
        let mut config = TrellisConfig::default();
        config.render.min_supported_version = Some(3);
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "render.min_supported_version")
        );
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = TrellisConfig::default();
        config.render.cache_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = TrellisConfig::default();
        config.server.data_file = Some(PathBuf::from("data.json"));
        config.style.palette.insert("accent".into(), "#123456".into());
        let text = config.to_toml_string().unwrap();
        assert_eq!(TrellisConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = TrellisConfig::default_path();
        assert!(path.ends_with("trellis/config.toml"));
    }
}
