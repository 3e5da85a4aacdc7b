use std::io::Write;
use tempfile::NamedTempFile;
use trellis_config::{ConfigError, LogFormat, TrellisConfig};

#[test]
fn loads_explicit_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r##"
[server]
bind_address = "0.0.0.0"
port = 8181
data_file = "directory.json"

[client]
base_url = "https://screens.example.test"
timeout_seconds = 5

[logging]
format = "pretty"

[style.palette]
critical = "#CC0000"
"##
    )
    .unwrap();

    let config = TrellisConfig::from_file(file.path()).unwrap();
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.server.data_file.as_deref(), Some(std::path::Path::new("directory.json")));
    assert_eq!(config.client.timeout().as_secs(), 5);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.style.palette["critical"], "#CC0000");
}

#[test]
fn missing_explicit_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = TrellisConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { path: p, .. } if p == path));
}

#[test]
fn written_config_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = TrellisConfig::default();
    config.render.max_depth = 12;
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(TrellisConfig::from_file(&path).unwrap().render.max_depth, 12);
}
