//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::websocket::{EchoPolicy, HubConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP / WebSocket listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Broadcast relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Send each message back to the connection it came from
    #[serde(default = "default_echo_to_sender")]
    pub echo_to_sender: bool,
}

fn default_echo_to_sender() -> bool {
    true
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            echo_to_sender: default_echo_to_sender(),
        }
    }
}

impl RelayConfig {
    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            echo: EchoPolicy::from_echo_flag(self.echo_to_sender),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// A resolved configuration plus what happened while resolving it
///
/// Loading runs before logging is initialized, so problems are collected here
/// and reported by [`LoadedConfig::log_diagnostics`] afterwards.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration came from, `None` for defaults
    pub source: Option<PathBuf>,
    /// Files that could not be loaded and overrides that were ignored
    pub diagnostics: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Emit the load outcome through `tracing`
    pub fn log_diagnostics(&self) {
        for problem in &self.diagnostics {
            tracing::warn!("{}", problem);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> LoadedConfig {
        let mut config = Config::default();
        let diagnostics = config.apply_env_overrides();
        LoadedConfig {
            config,
            source: None,
            diagnostics,
        }
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<LoadedConfig, ConfigError> {
        let mut config = Self::load(path)?;
        let diagnostics = config.apply_env_overrides();
        Ok(LoadedConfig {
            config,
            source: Some(path.to_path_buf()),
            diagnostics,
        })
    }

    /// Load from default locations or environment
    pub fn load_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("livechat").join("config.toml")),
            Some(PathBuf::from("/etc/livechat/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths, |key| std::env::var(key).ok())
    }

    /// Load the first readable file among `paths`, then apply overrides
    ///
    /// Files that exist but fail to load are recorded and skipped.
    fn load_first(paths: &[PathBuf], lookup: impl Fn(&str) -> Option<String>) -> LoadedConfig {
        let mut loaded = LoadedConfig::default();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load(path) {
                Ok(config) => {
                    loaded.config = config;
                    loaded.source = Some(path.clone());
                    break;
                }
                Err(e) => loaded.diagnostics.push(e),
            }
        }

        let ignored = loaded.config.apply_overrides(lookup);
        loaded.diagnostics.extend(ignored);
        loaded
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Vec<ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the process environment in practice)
    ///
    /// Values that cannot be parsed leave the setting unchanged and are returned.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<ConfigError> {
        let mut ignored = Vec::new();

        // Server overrides
        if let Some(host) = lookup("LIVECHAT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("LIVECHAT_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => ignored.push(ConfigError::invalid_env("LIVECHAT_PORT", port)),
            }
        }

        // Relay overrides
        if let Some(echo) = lookup("LIVECHAT_ECHO_TO_SENDER") {
            match parse_flag(&echo) {
                Some(flag) => self.relay.echo_to_sender = flag,
                None => ignored.push(ConfigError::invalid_env("LIVECHAT_ECHO_TO_SENDER", echo)),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("LIVECHAT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LIVECHAT_LOG_FORMAT") {
            self.logging.format = format;
        }

        ignored
    }
}

/// `true`/`false` in any case, or `1`/`0`
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" => Some(true),
        "0" => Some(false),
        other => other.to_ascii_lowercase().parse().ok(),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Ignoring invalid {key} value {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

impl ConfigError {
    fn invalid_env(key: &'static str, value: String) -> Self {
        ConfigError::InvalidEnv { key, value }
    }
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Live Chat Configuration
#
# Environment variables override these settings:
# - LIVECHAT_HOST
# - LIVECHAT_PORT
# - LIVECHAT_ECHO_TO_SENDER
# - LIVECHAT_LOG_LEVEL
# - LIVECHAT_LOG_FORMAT

[server]
# Address to listen on
host = "0.0.0.0"

# Port for both HTTP and WebSocket traffic
port = 3000

[relay]
# Deliver each message back to the client that sent it
echo_to_sender = true

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
