//! Configuration loading and typed config structures for the Skywatch server.
//!
//! The canonical configuration lives in `skywatch-config.yaml` in the
//! working directory. This module defines strongly-typed structs that
//! mirror the YAML structure, and provides a loader that reads and
//! validates the file. Every section is optional; missing values fall
//! back to the defaults below.

use std::path::Path;

use serde::Deserialize;
use skywatch_types::AlertCriterion;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SkywatchConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Live event stream settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Alerting settings.
    #[serde(default)]
    pub alerts: AlertsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SkywatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `SKYWATCH_HOST` overrides `server.host`
    /// - `SKYWATCH_PORT` overrides `server.port`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would leave the server unable to run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.client_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "stream.client_queue_capacity",
                reason: "must be at least 1".to_owned(),
            });
        }
        if let Some(empty) = self.alerts.seed_criteria.iter().position(AlertCriterion::is_empty) {
            return Err(ConfigError::Invalid {
                field: "alerts.seed_criteria",
                reason: format!("entry {empty} has neither icao nor callsign"),
            });
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSection {
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("SKYWATCH_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("SKYWATCH_PORT") {
            self.port = port.parse().map_err(|e| ConfigError::Invalid {
                field: "server.port",
                reason: format!("SKYWATCH_PORT={port}: {e}"),
            })?;
        }
        Ok(())
    }
}

/// Live event stream configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamConfig {
    /// Outbound queue capacity per connected client. A client whose queue
    /// is full when a broadcast arrives is disconnected.
    #[serde(default = "default_client_queue_capacity")]
    pub client_queue_capacity: usize,

    /// Seconds between SSE keep-alive comments. `0` disables them.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            client_queue_capacity: default_client_queue_capacity(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

/// Alerting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertsConfig {
    /// Criteria installed at startup, before any client can add more.
    #[serde(default = "default_seed_criteria")]
    pub seed_criteria: Vec<AlertCriterion>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            seed_criteria: default_seed_criteria(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_client_queue_capacity() -> usize {
    256
}

const fn default_keep_alive_secs() -> u64 {
    15
}

fn default_seed_criteria() -> Vec<AlertCriterion> {
    vec![
        AlertCriterion::by_callsign("TARGET1"),
        AlertCriterion::by_icao("AABBCC"),
    ]
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SkywatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stream.client_queue_capacity, 256);
        assert_eq!(config.alerts.seed_criteria.len(), 2);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
server:
  host: 127.0.0.1
  port: 9090
stream:
  client_queue_capacity: 16
  keep_alive_secs: 0
alerts:
  seed_criteria:
    - icao: ABC123
    - callsign: WATCH1
      icao: DEF456
logging:
  level: debug
";
        let config = SkywatchConfig::parse(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.stream.client_queue_capacity, 16);
        assert_eq!(config.stream.keep_alive_secs, 0);
        assert_eq!(config.alerts.seed_criteria.len(), 2);
        assert_eq!(
            config.alerts.seed_criteria[1].callsign.as_deref(),
            Some("WATCH1")
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SkywatchConfig::parse("").unwrap();
        assert_eq!(config.stream, StreamConfig::default());
        assert_eq!(config.alerts, AlertsConfig::default());
    }

    #[test]
    fn explicit_empty_seed_list_is_kept() {
        let config = SkywatchConfig::parse("alerts:\n  seed_criteria: []\n").unwrap();
        assert!(config.alerts.seed_criteria.is_empty());
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let result = SkywatchConfig::parse("stream:\n  client_queue_capacity: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn blank_seed_criterion_is_rejected() {
        let result = SkywatchConfig::parse("alerts:\n  seed_criteria:\n    - {}\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../skywatch-config.yaml");
        let config = SkywatchConfig::from_file(&path).unwrap();
        assert_eq!(config.stream.client_queue_capacity, 256);
    }
}
