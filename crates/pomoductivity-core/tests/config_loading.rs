use std::fs;

use pomoductivity_core::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn loads_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[server]
port = 4100
cors_origin = "*"
environment = "production"

[alerts]
enabled = false
pushover_api_token = "app"
"#,
    )
    .unwrap();

    let cfg = Config::load_from(&path).unwrap();
    assert_eq!(cfg.server.port, 4100);
    assert_eq!(cfg.server.cors_origin, "*");
    assert!(!cfg.is_development());
    assert!(!cfg.alerts.enabled);
    assert_eq!(cfg.alerts.pushover_api_token.as_deref(), Some("app"));
    assert!(cfg.alerts.pushover_user_key.is_none());
}

#[test]
fn empty_file_is_all_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "").unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn broken_file_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[server\nport = 1").unwrap();

    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseFailed(_))
    ));
}
