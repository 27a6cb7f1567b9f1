//! Coordination service interface
//!
//! The coordination service owns connections, retries and timeouts. This
//! module only asks it for a serving keyspace document and builds the
//! snapshot from whatever comes back.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, TopoError};
use crate::topology::Keyspace;

/// Cell queried when the caller does not name one
pub const DEFAULT_CELL: &str = "local";

/// Source of serving keyspace documents
#[async_trait]
pub trait TopoServer: Send + Sync {
    /// Fetch the serving keyspace document of `keyspace` in `cell`
    ///
    /// An absent document is returned as `Value::Null`.
    async fn get_srv_keyspace(&self, cell: &str, keyspace: &str) -> Result<Value>;
}

/// Read a keyspace snapshot from the default cell
pub async fn read_keyspace(server: &dyn TopoServer, keyspace: &str) -> Result<Keyspace> {
    read_keyspace_in_cell(server, DEFAULT_CELL, keyspace).await
}

/// Read a keyspace snapshot from `cell`
///
/// Any failure, including an empty document, is reported as
/// [`TopoError::Operational`] for `keyspace`. An operational error raised by
/// the server itself is passed through as is.
pub async fn read_keyspace_in_cell(
    server: &dyn TopoServer,
    cell: &str,
    keyspace: &str,
) -> Result<Keyspace> {
    let result = match server.get_srv_keyspace(cell, keyspace).await {
        Ok(raw) => Keyspace::from_document(keyspace, &raw),
        Err(e) => Err(e),
    };

    match result {
        Ok(ks) => {
            debug!("Read keyspace {} from cell {}", keyspace, cell);
            Ok(ks)
        }
        Err(e) => {
            warn!("Failed to read keyspace {} from cell {}: {}", keyspace, cell, e);
            Err(TopoError::operational(keyspace, e))
        }
    }
}
