//! Keyspace topology and shard resolution
//!
//! Provides sharding functionality for range-sharded keyspaces:
//! - Serving keyspace document to immutable snapshot
//! - Canonical shard names derived from key range boundaries
//! - Keyspace id to owning shard mapping
//! - Coordination service interface for fetching snapshots

pub mod error;
pub mod key_range;
pub mod resolver;
pub mod topo_server;
pub mod topology;

// Re-export commonly used types
pub use error::{Result, TopoError};
pub use key_range::{KeyRange, KeyspaceId, KeyspaceIdType, MAX_KEY, MIN_KEY, SHARD_ZERO};
pub use topo_server::{read_keyspace, read_keyspace_in_cell, TopoServer, DEFAULT_CELL};
pub use topology::{Keyspace, Partition, Shard, SrvKeyspace, ROLE_MASTER, ROLE_RDONLY, ROLE_REPLICA};
