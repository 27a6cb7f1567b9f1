//! Serving keyspace topology snapshot
//!
//! Decodes the serving keyspace document published by the coordination
//! service into an immutable [`Keyspace`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::error::{Result, TopoError};
use crate::key_range::{KeyRange, KeyspaceIdType};

/// Role class of the primary database
pub const ROLE_MASTER: &str = "master";
/// Role class of serving replicas
pub const ROLE_REPLICA: &str = "replica";
/// Role class of read-only batch replicas
pub const ROLE_RDONLY: &str = "rdonly";

/// One shard of a role class partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    #[serde(rename = "KeyRange", default, deserialize_with = "null_as_default")]
    pub key_range: KeyRange,
}

impl Shard {
    pub fn new(key_range: KeyRange) -> Self {
        Self { key_range }
    }
}

/// Shards serving one role class, ordered by ascending start key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    #[serde(rename = "Shards", default, deserialize_with = "null_as_default")]
    pub shards: Vec<Shard>,
}

/// Serving keyspace document as published by the coordination service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SrvKeyspace {
    #[serde(rename = "TabletTypes", deserialize_with = "null_as_default")]
    pub tablet_types: Vec<String>,
    #[serde(rename = "Partitions", deserialize_with = "null_as_default")]
    pub partitions: BTreeMap<String, Partition>,
    #[serde(rename = "ShardingColumnName", deserialize_with = "null_as_default")]
    pub sharding_column_name: String,
    #[serde(rename = "ShardingColumnType", deserialize_with = "null_as_default")]
    pub sharding_column_type: KeyspaceIdType,
    #[serde(rename = "ServedFrom")]
    pub served_from: Option<BTreeMap<String, String>>,
}

/// The coordination service publishes empty lists and maps as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sharding metadata of one keyspace
///
/// Built once from a serving keyspace document and never mutated, so a
/// snapshot can be shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyspace {
    name: String,
    served_role_classes: BTreeSet<String>,
    partitions: BTreeMap<String, Vec<Shard>>,
    sharding_column_name: String,
    sharding_column_type: KeyspaceIdType,
    served_from: Option<BTreeMap<String, String>>,
}

impl Keyspace {
    /// Build a snapshot from an already decoded document
    pub fn new(name: impl Into<String>, doc: SrvKeyspace) -> Self {
        let partitions = doc
            .partitions
            .into_iter()
            .map(|(role, partition)| (role, partition.shards))
            .collect();

        Self {
            name: name.into(),
            served_role_classes: doc.tablet_types.into_iter().collect(),
            partitions,
            sharding_column_name: doc.sharding_column_name,
            sharding_column_type: doc.sharding_column_type,
            served_from: doc.served_from,
        }
    }

    /// Build a snapshot from a raw serving keyspace document
    ///
    /// A null or empty document is rejected. Missing fields take their
    /// defaults: no partitions, an empty sharding column name and an unset
    /// sharding column type.
    pub fn from_document(name: &str, raw: &Value) -> Result<Self> {
        let invalid = |reason: String| TopoError::InvalidTopology {
            keyspace: name.to_string(),
            reason,
        };

        match raw {
            Value::Null => return Err(invalid("empty keyspace document".to_string())),
            Value::Object(fields) if fields.is_empty() => {
                return Err(invalid("empty keyspace document".to_string()))
            }
            Value::Object(_) => {}
            other => return Err(invalid(format!("expected an object, got {other}"))),
        }

        let doc = SrvKeyspace::deserialize(raw).map_err(|e| invalid(e.to_string()))?;
        let keyspace = Self::new(name, doc);

        debug!(
            "Built keyspace {}: role classes {:?}, {} partitions, sharding column {} ({})",
            keyspace.name,
            keyspace.served_role_classes,
            keyspace.partitions.len(),
            keyspace.sharding_column_name,
            keyspace.sharding_column_type
        );

        Ok(keyspace)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role classes the keyspace is served for
    pub fn served_role_classes(&self) -> &BTreeSet<String> {
        &self.served_role_classes
    }

    pub fn serves(&self, role: &str) -> bool {
        self.served_role_classes.contains(role)
    }

    pub fn sharding_column_name(&self) -> &str {
        &self.sharding_column_name
    }

    pub fn sharding_column_type(&self) -> KeyspaceIdType {
        self.sharding_column_type
    }

    /// Keyspace actually serving `role`, when that role class is redirected
    pub fn served_from(&self, role: &str) -> Option<&str> {
        self.served_from
            .as_ref()
            .and_then(|redirects| redirects.get(role))
            .map(String::as_str)
    }

    pub(crate) fn partition(&self, role: &str) -> Option<&[Shard]> {
        self.partitions.get(role).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_document() {
        let raw = json!({
            "TabletTypes": ["master", "replica"],
            "Partitions": {
                "master": {"Shards": [
                    {"KeyRange": {"Start": "", "End": "80"}},
                    {"KeyRange": {"Start": "80", "End": ""}}
                ]}
            },
            "ShardingColumnName": "user_id",
            "ShardingColumnType": "uint64"
        });

        let ks = Keyspace::from_document("user", &raw).unwrap();
        assert_eq!(ks.name(), "user");
        assert!(ks.serves(ROLE_MASTER));
        assert!(ks.serves(ROLE_REPLICA));
        assert!(!ks.serves(ROLE_RDONLY));
        assert_eq!(ks.sharding_column_name(), "user_id");
        assert_eq!(ks.sharding_column_type(), KeyspaceIdType::Uint64);
        assert_eq!(ks.partition(ROLE_MASTER).unwrap().len(), 2);
        assert!(ks.partition(ROLE_REPLICA).is_none());
        assert_eq!(ks.served_from(ROLE_MASTER), None);
    }

    #[test]
    fn test_from_document_defaults() {
        let ks = Keyspace::from_document("lookup", &json!({"TabletTypes": ["master"]})).unwrap();
        assert!(ks.partition(ROLE_MASTER).is_none());
        assert_eq!(ks.sharding_column_name(), "");
        assert_eq!(ks.sharding_column_type(), KeyspaceIdType::Unset);
        assert_eq!(ks.served_from(ROLE_MASTER), None);

        // The served role classes are not required to build a snapshot
        let ks = Keyspace::from_document("lookup", &json!({"ShardingColumnName": "id"})).unwrap();
        assert!(ks.served_role_classes().is_empty());
    }

    #[test]
    fn test_from_document_null_fields() {
        let raw = json!({
            "TabletTypes": null,
            "Partitions": null,
            "ShardingColumnName": null,
            "ShardingColumnType": null,
            "ServedFrom": null
        });
        let ks = Keyspace::from_document("user", &raw).unwrap();
        assert!(ks.served_role_classes().is_empty());
        assert!(ks.shards(ROLE_MASTER).unwrap().is_empty());
        assert_eq!(ks.sharding_column_name(), "");
        assert_eq!(ks.sharding_column_type(), KeyspaceIdType::Unset);
        assert_eq!(ks.served_from(ROLE_RDONLY), None);

        let raw = json!({
            "TabletTypes": ["master"],
            "Partitions": {
                "master": {"Shards": [{"KeyRange": null}]},
                "replica": {"Shards": null}
            }
        });
        let ks = Keyspace::from_document("user", &raw).unwrap();
        assert_eq!(ks.shard_names(ROLE_MASTER).unwrap(), vec!["0"]);
        assert_eq!(ks.shard_count(ROLE_REPLICA).unwrap(), 0);
    }

    #[test]
    fn test_from_document_served_from() {
        let raw = json!({
            "TabletTypes": ["master"],
            "ServedFrom": {"rdonly": "source_keyspace"}
        });
        let ks = Keyspace::from_document("dest", &raw).unwrap();
        assert_eq!(ks.served_from(ROLE_RDONLY), Some("source_keyspace"));
        assert_eq!(ks.served_from(ROLE_MASTER), None);
    }

    #[test]
    fn test_from_document_rejects_empty() {
        for raw in [Value::Null, json!({})] {
            match Keyspace::from_document("user", &raw) {
                Err(TopoError::InvalidTopology { keyspace, .. }) => assert_eq!(keyspace, "user"),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_document_rejects_malformed() {
        assert!(matches!(
            Keyspace::from_document("user", &json!(["master"])),
            Err(TopoError::InvalidTopology { .. })
        ));
        assert!(matches!(
            Keyspace::from_document("user", &json!({"ShardingColumnType": "float"})),
            Err(TopoError::InvalidTopology { .. })
        ));
        assert!(matches!(
            Keyspace::from_document(
                "user",
                &json!({"Partitions": {"master": {"Shards": [{"KeyRange": {"End": "8g"}}]}}})
            ),
            Err(TopoError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_keyspace_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Keyspace>();
    }
}
