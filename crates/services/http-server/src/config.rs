//! Configuration for the HTTP server binary
//!
//! Configuration can be loaded from a TOML file and/or environment variables.
//! Environment variables override values read from the file.
//!
//! ```toml
//! [server]
//! bind_address = "127.0.0.1:8080"
//! route = "/"
//!
//! [remote_stage]
//! url = "http://127.0.0.1:8081/"
//! method = "GET"
//! ```

use remotestage_http::{RemoteStageConfig, DEFAULT_ROUTE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_VAR: &str = "REMOTESTAGE_CONFIG";

/// Main configuration for the HTTP server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote stage to wrap instead of the identity step
    #[serde(default)]
    pub remote_stage: Option<RemoteStageConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Route the pipeline is served under
    #[serde(default = "default_route")]
    pub route: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_route() -> String {
    DEFAULT_ROUTE.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            route: default_route(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Load from the file named by `REMOTESTAGE_CONFIG` (if any), then apply
    /// environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Config::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply `HTTP_BIND_ADDRESS`, `HTTP_ROUTE`, `REMOTE_STAGE_URL` and
    /// `REMOTE_STAGE_METHOD` as looked up by `var`
    pub fn with_env_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("HTTP_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(route) = var("HTTP_ROUTE") {
            self.server.route = route;
        }

        if let Some(url) = var("REMOTE_STAGE_URL") {
            match self.remote_stage.as_mut() {
                Some(remote) => remote.url = url,
                None => self.remote_stage = Some(RemoteStageConfig::new(url)),
            }
        }
        if let Some(method) = var("REMOTE_STAGE_METHOD") {
            match self.remote_stage.as_mut() {
                Some(remote) => remote.method = method,
                None => tracing::warn!(
                    "REMOTE_STAGE_METHOD is set but no remote stage is configured, ignoring"
                ),
            }
        }

        self
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
