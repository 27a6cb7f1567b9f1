//! Configuration for topology clients
//!
//! Supports YAML configuration files with module-based organization

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use topo_core::{Result, TopoServer, DEFAULT_CELL};

use crate::file::FileTopoServer;
use crate::http::HttpTopoServer;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Coordination service configuration
    #[serde(default)]
    pub topo: TopoConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> std::result::Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to YAML file
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> std::result::Result<(), ConfigError> {
        let yaml =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        std::fs::write(path, yaml).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        self.topo.merge(other.topo);
        self.log.merge(other.log);
    }
}

/// Coordination service backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopoBackend {
    /// Coordination service HTTP API
    Http,
    /// Local topology directory
    File,
}

impl std::str::FromStr for TopoBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(TopoBackend::Http),
            "file" => Ok(TopoBackend::File),
            other => Err(ConfigError::ParseError(format!("unknown topo backend: {other}"))),
        }
    }
}

/// Coordination service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopoConfig {
    /// Backend (defaults to http)
    #[serde(default)]
    pub backend: Option<TopoBackend>,
    /// HTTP API address
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Topology directory for the file backend
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Cell to read keyspaces from
    #[serde(default = "default_cell")]
    pub cell: String,
    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_addr() -> String {
    "http://127.0.0.1:15000".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./topo_data")
}

fn default_cell() -> String {
    DEFAULT_CELL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl Default for TopoConfig {
    fn default() -> Self {
        Self {
            backend: None,
            addr: default_addr(),
            data_dir: default_data_dir(),
            cell: default_cell(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl TopoConfig {
    fn merge(&mut self, other: Self) {
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if !other.addr.is_empty() {
            self.addr = other.addr;
        }
        if !other.data_dir.as_os_str().is_empty() {
            self.data_dir = other.data_dir;
        }
        if !other.cell.is_empty() {
            self.cell = other.cell;
        }
        if other.request_timeout_secs > 0 {
            self.request_timeout_secs = other.request_timeout_secs;
        }
    }

    pub fn backend(&self) -> TopoBackend {
        self.backend.unwrap_or(TopoBackend::Http)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build the configured coordination service client
    pub fn build_server(&self) -> Result<Box<dyn TopoServer>> {
        let server: Box<dyn TopoServer> = match self.backend() {
            TopoBackend::Http => Box::new(HttpTopoServer::new(&self.addr, self.request_timeout())?),
            TopoBackend::File => Box::new(FileTopoServer::new(&self.data_dir)),
        };
        Ok(server)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    fn merge(&mut self, other: Self) {
        if !other.level.is_empty() {
            self.level = other.level;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
}
