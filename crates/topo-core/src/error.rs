//! Topology errors
//!
//! Every failure surfaced by snapshot construction, shard resolution and
//! topology fetches.

use thiserror::Error;

/// Topology error
#[derive(Debug, Error)]
pub enum TopoError {
    /// Raw topology document was empty, absent or undecodable
    #[error("Invalid topology for keyspace {keyspace}: {reason}")]
    InvalidTopology { keyspace: String, reason: String },

    /// Caller passed an empty role class
    #[error("Role class is not set")]
    MissingRoleClass,

    /// Caller passed an empty or malformed argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Role class has no range-sharded shards
    #[error("Keyspace {keyspace} is not range sharded for role class {role}")]
    Unsharded { keyspace: String, role: String },

    /// No configured shard covers the keyspace id
    #[error("Keyspace id {keyspace_id} is not covered by any shard of keyspace {keyspace}")]
    OutOfRange {
        keyspace: String,
        keyspace_id: String,
    },

    /// Coordination service could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Coordination service has no such keyspace in the cell
    #[error("Keyspace {keyspace} not found in cell {cell}")]
    NotFound { cell: String, keyspace: String },

    /// Fetch-side failure for a keyspace, wrapping the original cause
    #[error("Failed to read keyspace {keyspace}: {source}")]
    Operational {
        keyspace: String,
        #[source]
        source: Box<TopoError>,
    },
}

impl TopoError {
    /// Wrap an error as an operational failure of `keyspace`.
    ///
    /// An error that is already operational is returned unchanged.
    pub fn operational(keyspace: impl Into<String>, err: TopoError) -> Self {
        match err {
            TopoError::Operational { .. } => err,
            other => TopoError::Operational {
                keyspace: keyspace.into(),
                source: Box::new(other),
            },
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, TopoError::Operational { .. })
    }

    /// Innermost error, following operational wrappers
    pub fn root_cause(&self) -> &TopoError {
        match self {
            TopoError::Operational { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, TopoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_operational_wraps_once() {
        let inner = TopoError::Connection("refused".to_string());
        let wrapped = TopoError::operational("user", inner);
        assert!(wrapped.is_operational());
        assert!(wrapped.source().is_some());

        let rewrapped = TopoError::operational("other", wrapped);
        match &rewrapped {
            TopoError::Operational { keyspace, source } => {
                assert_eq!(keyspace, "user");
                assert!(matches!(**source, TopoError::Connection(_)));
            }
            e => panic!("unexpected error: {e:?}"),
        }
    }

    #[test]
    fn test_root_cause() {
        let err = TopoError::operational(
            "user",
            TopoError::NotFound {
                cell: "local".to_string(),
                keyspace: "user".to_string(),
            },
        );
        assert!(matches!(err.root_cause(), TopoError::NotFound { .. }));
        assert!(err.to_string().contains("user"));
    }
}
