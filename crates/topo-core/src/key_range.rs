//! Key ranges and keyspace ids
//!
//! A keyspace id is compared against shard boundaries as a big-endian byte
//! string. Boundaries are ordered lexicographically, so a short boundary such
//! as `80` splits the 64-bit space at its midpoint.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopoError};

/// Width of a normalized keyspace id in bytes
pub const KEYSPACE_ID_WIDTH: usize = 8;

/// Open lower end of the keyspace id space
pub const MIN_KEY: &[u8] = b"";

/// Open upper end of the keyspace id space
pub const MAX_KEY: &[u8] = b"";

/// Name of the single shard of an unsharded keyspace
pub const SHARD_ZERO: &str = "0";

/// Key range [start, end)
///
/// An empty `start` is unbounded below, an empty `end` is unbounded above.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRange {
    /// Start key (inclusive)
    #[serde(rename = "Start", with = "hex_bytes", default)]
    pub start: Vec<u8>,
    /// End key (exclusive)
    #[serde(rename = "End", with = "hex_bytes", default)]
    pub end: Vec<u8>,
}

impl KeyRange {
    pub fn new(start: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Range covering the whole keyspace id space
    pub fn full() -> Self {
        Self::default()
    }

    pub fn is_full(&self) -> bool {
        self.start.is_empty() && self.end.is_empty()
    }

    /// Check if a normalized key lies within this range
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.start.as_slice() && !is_at_or_past_end(&self.end, key)
    }
}

impl std::fmt::Display for KeyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            hex::encode_upper(&self.start),
            hex::encode_upper(&self.end)
        )
    }
}

/// True when `key` is at or past `end`; an empty `end` is never reached.
pub(crate) fn is_at_or_past_end(end: &[u8], key: &[u8]) -> bool {
    !end.is_empty() && key >= end
}

/// Type of the sharding column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyspaceIdType {
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "uint64")]
    Uint64,
    #[serde(rename = "bytes")]
    Bytes,
}

impl Default for KeyspaceIdType {
    fn default() -> Self {
        Self::Unset
    }
}

impl std::fmt::Display for KeyspaceIdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyspaceIdType::Unset => write!(f, "unset"),
            KeyspaceIdType::Uint64 => write!(f, "uint64"),
            KeyspaceIdType::Bytes => write!(f, "bytes"),
        }
    }
}

/// Keyspace id of a row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyspaceId {
    Uint64(u64),
    Bytes(Vec<u8>),
}

impl KeyspaceId {
    /// Parse a textual keyspace id according to the sharding column type
    ///
    /// `uint64` (and unset) ids accept decimal or `0x`-prefixed hex, `bytes`
    /// ids accept a hex string.
    pub fn parse(text: &str, id_type: KeyspaceIdType) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TopoError::InvalidArgument("keyspace id is not set".to_string()));
        }
        let hex_digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"));

        match id_type {
            KeyspaceIdType::Uint64 | KeyspaceIdType::Unset => {
                let value = match hex_digits {
                    Some(digits) => u64::from_str_radix(digits, 16),
                    None => text.parse::<u64>(),
                };
                value.map(KeyspaceId::Uint64).map_err(|e| {
                    TopoError::InvalidArgument(format!("invalid uint64 keyspace id {text}: {e}"))
                })
            }
            KeyspaceIdType::Bytes => hex::decode(hex_digits.unwrap_or(text))
                .map(KeyspaceId::Bytes)
                .map_err(|e| {
                    TopoError::InvalidArgument(format!("invalid bytes keyspace id {text}: {e}"))
                }),
        }
    }

    /// An empty byte string is the only unset keyspace id
    ///
    /// `Uint64(0)` is a valid id and is not treated as unset.
    pub fn is_empty(&self) -> bool {
        matches!(self, KeyspaceId::Bytes(b) if b.is_empty())
    }

    /// Normalized big-endian key used for range comparison
    ///
    /// Byte ids shorter than the id width are zero-padded on the right.
    pub fn to_key(&self) -> Vec<u8> {
        match self {
            KeyspaceId::Uint64(v) => v.to_be_bytes().to_vec(),
            KeyspaceId::Bytes(b) => {
                let mut key = b.clone();
                if key.len() < KEYSPACE_ID_WIDTH {
                    key.resize(KEYSPACE_ID_WIDTH, 0);
                }
                key
            }
        }
    }
}

impl From<u64> for KeyspaceId {
    fn from(value: u64) -> Self {
        KeyspaceId::Uint64(value)
    }
}

impl From<Vec<u8>> for KeyspaceId {
    fn from(value: Vec<u8>) -> Self {
        KeyspaceId::Bytes(value)
    }
}

impl std::fmt::Display for KeyspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode_upper(self.to_key()))
    }
}

/// Hex string encoding of key range bounds
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_upper(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}
