//! Configuration management for notebook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "notebook";

/// Default RPC endpoint prefix.
pub const DEFAULT_ENDPOINT: &str = "/api/notes";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `NOTEBOOK_`, `__` between sections)
/// 2. TOML config file at `~/.config/notebook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Registry configuration.
    pub registry: RegistryConfig,
    /// Client configuration.
    pub client: ClientConfig,
}

/// Server-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind. Zero picks a free port.
    pub port: u16,
    /// Path prefix for the note routes.
    pub endpoint: String,
    /// Interval between pings on the snapshot socket, in milliseconds. A
    /// subscriber silent for longer than twice this is disconnected.
    pub keepalive_ms: u64,
}

/// Registry-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of notes to keep in memory.
    /// Set to 0 for unlimited.
    pub max_notes: usize,
}

/// Client-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server host to connect to.
    pub host: String,
    /// Server port to connect to.
    pub port: u16,
    /// Path prefix for the note routes.
    pub endpoint: String,
    /// Timeout for a single request in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            keepalive_ms: 15_000,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    /// The `host:port` string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The snapshot socket ping interval.
    #[must_use]
    pub fn keepalive(&self) -> Duration {
        Duration::from_millis(self.keepalive_ms)
    }
}

impl ClientConfig {
    /// Base HTTP URL of the server, without the endpoint.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// WebSocket URL of the snapshot stream.
    #[must_use]
    pub fn stream_url(&self) -> String {
        format!("ws://{}:{}{}/stream", self.host, self.port, self.endpoint)
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl RegistryConfig {
    /// The capacity bound, or `None` when unlimited.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        if self.max_notes == 0 {
            None
        } else {
            Some(self.max_notes)
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `NOTEBOOK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("NOTEBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        validate_endpoint("server.endpoint", &self.server.endpoint)?;
        validate_endpoint("client.endpoint", &self.client.endpoint)?;

        if self.client.request_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "request_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.server.keepalive_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "keepalive_ms must be greater than 0".to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Endpoints are nested under the router, so they need a leading slash and
/// cannot be the root or end in a slash.
fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    if !endpoint.starts_with('/') {
        return Err(Error::ConfigValidation {
            message: format!("{field} must start with '/': {endpoint}"),
        });
    }
    if endpoint.len() == 1 || endpoint.ends_with('/') {
        return Err(Error::ConfigValidation {
            message: format!("{field} cannot be '/' or end with '/': {endpoint}"),
        });
    }
    Ok(())
}
