//! File-backed topology
//!
//! Serves keyspace documents stored as `<data_dir>/<cell>/<keyspace>.json`

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use topo_core::{Result, TopoError, TopoServer};

/// Topology directory on the local file system
pub struct FileTopoServer {
    data_dir: PathBuf,
}

impl FileTopoServer {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a keyspace document
    pub fn keyspace_path(&self, cell: &str, keyspace: &str) -> PathBuf {
        self.data_dir.join(cell).join(format!("{keyspace}.json"))
    }

    /// Publish a keyspace document
    pub async fn save(&self, cell: &str, keyspace: &str, doc: &Value) -> Result<()> {
        let path = self.keyspace_path(cell, keyspace);
        let io_err = |e: std::io::Error| TopoError::Connection(format!("{}: {e}", path.display()));

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await.map_err(io_err)?;
        }

        // Write to temp file first, then atomically rename
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(doc).map_err(|e| TopoError::InvalidTopology {
            keyspace: keyspace.to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&temp_path, &content).await.map_err(io_err)?;
        fs::rename(&temp_path, &path).await.map_err(io_err)?;

        info!("Saved keyspace {} to {}", keyspace, path.display());
        Ok(())
    }
}

#[async_trait]
impl TopoServer for FileTopoServer {
    async fn get_srv_keyspace(&self, cell: &str, keyspace: &str) -> Result<Value> {
        let path = self.keyspace_path(cell, keyspace);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TopoError::NotFound {
                    cell: cell.to_string(),
                    keyspace: keyspace.to_string(),
                })
            }
            Err(e) => {
                return Err(TopoError::Connection(format!("{}: {e}", path.display())));
            }
        };

        if content.trim().is_empty() {
            return Ok(Value::Null);
        }

        let doc = serde_json::from_str(&content).map_err(|e| TopoError::InvalidTopology {
            keyspace: keyspace.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;

        debug!("Loaded keyspace {} from {}", keyspace, path.display());
        Ok(doc)
    }
}
