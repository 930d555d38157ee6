//! TOML-based server configuration.
//!
//! Sources, later wins:
//! - built-in defaults
//! - a TOML file (explicit path, or `~/.config/pomoductivity/config.toml`)
//! - environment variables (`PORT`, `CORS_ORIGIN`, `PUSHOVER_*`, ...)
//!
//! Timer durations are not configured here; they live in the settings store
//! and change only through its API.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::alerts::PUSHOVER_ENDPOINT;
use crate::error::ConfigError;

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// Push alert configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub pushover_user_key: Option<String>,
    #[serde(default)]
    pub pushover_api_token: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

fn default_port() -> u16 {
    3000
}
fn default_cors_origin() -> String {
    "http://localhost:4200".into()
}
fn default_environment() -> String {
    "development".into()
}
fn default_true() -> bool {
    true
}
fn default_endpoint() -> String {
    PUSHOVER_ENDPOINT.into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origin: default_cors_origin(),
            environment: default_environment(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pushover_user_key: None,
            pushover_api_token: None,
            endpoint: default_endpoint(),
        }
    }
}

/// Returns `~/.config/pomoductivity[-dev]/` based on POMODUCTIVITY_ENV.
///
/// Set POMODUCTIVITY_ENV=dev to use the development directory.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMODUCTIVITY_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("pomoductivity-dev")
    } else {
        base_dir.join("pomoductivity")
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Parse a TOML document. Missing sections and keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Resolve the full configuration: explicit file or the default file if
    /// present, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but is invalid, or an
    /// environment override cannot be parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("'{port}' is not a valid port number"),
            })?;
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Some(env) = lookup("POMODUCTIVITY_ENVIRONMENT").or_else(|| lookup("NODE_ENV")) {
            self.server.environment = env;
        }
        if let Some(user) = lookup("PUSHOVER_USER_KEY") {
            self.alerts.pushover_user_key = Some(user);
        }
        if let Some(token) = lookup("PUSHOVER_API_TOKEN") {
            self.alerts.pushover_api_token = Some(token);
        }
        if let Some(endpoint) = lookup("PUSHOVER_ENDPOINT") {
            self.alerts.endpoint = endpoint;
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.server.environment == "development"
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
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.cors_origin, "http://localhost:4200");
        assert!(cfg.is_development());
        assert!(cfg.alerts.enabled);
        assert_eq!(cfg.alerts.endpoint, PUSHOVER_ENDPOINT);
        assert!(cfg.alerts.pushover_api_token.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            [server]
            port = 8080

            [alerts]
            pushover_user_key = "u-123"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.cors_origin, "http://localhost:4200");
        assert_eq!(cfg.alerts.pushover_user_key.as_deref(), Some("u-123"));
        assert!(cfg.alerts.enabled);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Config::from_toml("[server]\nport = \"eighty\""),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::from_toml("[server]\nport = 8080").unwrap();
        cfg.apply_env(env(&[
            ("PORT", "9000"),
            ("NODE_ENV", "production"),
            ("PUSHOVER_API_TOKEN", "tok"),
            ("PUSHOVER_USER_KEY", "usr"),
        ]))
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert!(!cfg.is_development());
        assert_eq!(cfg.alerts.pushover_api_token.as_deref(), Some("tok"));
        assert_eq!(cfg.alerts.pushover_user_key.as_deref(), Some("usr"));
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn load_from_missing_file_fails() {
        let err = Config::load_from(Path::new("/nonexistent/pomoductivity.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }
}
