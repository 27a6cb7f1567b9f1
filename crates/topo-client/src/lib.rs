//! Coordination service clients
//!
//! Concrete [`TopoServer`](topo_core::TopoServer) implementations:
//! - `HttpTopoServer`: coordination service HTTP API
//! - `FileTopoServer`: keyspace documents in a local directory

pub mod config;
pub mod file;
pub mod http;

// Re-export commonly used types
pub use config::{Config, ConfigError, LogConfig, TopoBackend, TopoConfig};
pub use file::FileTopoServer;
pub use http::HttpTopoServer;
