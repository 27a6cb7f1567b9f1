//! Shard resolution over a keyspace snapshot
//!
//! Provides functionality to:
//! - List the shards of a role class
//! - Derive canonical shard names from range boundaries
//! - Map a keyspace id to the shard that owns it

use tracing::debug;

use crate::error::{Result, TopoError};
use crate::key_range::{is_at_or_past_end, KeyRange, KeyspaceId, MAX_KEY, MIN_KEY, SHARD_ZERO};
use crate::topology::{Keyspace, Shard};

fn require_role(role: &str) -> Result<()> {
    if role.is_empty() {
        return Err(TopoError::MissingRoleClass);
    }
    Ok(())
}

impl Keyspace {
    /// Shards of a role class, ordered by ascending start key
    ///
    /// A role class absent from the partitions has no shards.
    pub fn shards(&self, role: &str) -> Result<&[Shard]> {
        require_role(role)?;
        Ok(self.partition(role).unwrap_or(&[]))
    }

    pub fn shard_count(&self, role: &str) -> Result<usize> {
        Ok(self.shards(role)?.len())
    }

    /// End key of every shard, in shard order
    pub fn shard_upper_bounds(&self, role: &str) -> Result<Vec<&[u8]>> {
        Ok(self
            .shards(role)?
            .iter()
            .map(|shard| shard.key_range.end.as_slice())
            .collect())
    }

    /// Ranges derived from consecutive upper bounds
    ///
    /// The first range starts at `MIN_KEY`, each following one starts where
    /// the previous shard ends.
    pub fn shard_key_ranges(&self, role: &str) -> Result<Vec<KeyRange>> {
        let bounds = self.shard_upper_bounds(role)?;
        let mut lower: &[u8] = MIN_KEY;
        Ok(bounds
            .into_iter()
            .map(|upper| {
                let range = KeyRange::new(lower, upper);
                lower = upper;
                range
            })
            .collect())
    }

    /// Canonical shard names of a role class
    ///
    /// A single shard ending at `MAX_KEY` is the unsharded shard `"0"`.
    /// Otherwise every shard is named `LOWER-UPPER` in upper-case hex.
    pub fn shard_names(&self, role: &str) -> Result<Vec<String>> {
        let ranges = self.shard_key_ranges(role)?;
        if let [only] = ranges.as_slice() {
            if only.end.as_slice() == MAX_KEY {
                return Ok(vec![SHARD_ZERO.to_string()]);
            }
        }
        Ok(ranges.iter().map(KeyRange::to_string).collect())
    }

    /// Name of the shard at `index`, built without naming the others
    fn shard_name_at(&self, role: &str, index: usize) -> Result<String> {
        let shards = self.shards(role)?;
        let upper = shards[index].key_range.end.as_slice();
        if shards.len() == 1 && upper == MAX_KEY {
            return Ok(SHARD_ZERO.to_string());
        }
        let lower = match index {
            0 => MIN_KEY,
            _ => shards[index - 1].key_range.end.as_slice(),
        };
        Ok(KeyRange::new(lower, upper).to_string())
    }

    /// Position of the shard owning a keyspace id
    ///
    /// Selects the first shard whose upper bound is strictly greater than
    /// the normalized id, so an id equal to a bound belongs to the next shard.
    pub fn keyspace_id_to_shard_index(&self, role: &str, keyspace_id: &KeyspaceId) -> Result<usize> {
        if keyspace_id.is_empty() {
            return Err(TopoError::InvalidArgument("keyspace id is not set".to_string()));
        }
        if role.is_empty() {
            return Err(TopoError::InvalidArgument("role class is not set".to_string()));
        }

        let shards = self.shards(role)?;
        if shards.is_empty() {
            return Err(TopoError::Unsharded {
                keyspace: self.name().to_string(),
                role: role.to_string(),
            });
        }

        // Upper bounds ascend, with an empty bound treated as unbounded
        let key = keyspace_id.to_key();
        let index =
            shards.partition_point(|shard| is_at_or_past_end(&shard.key_range.end, &key));
        if index == shards.len() {
            return Err(TopoError::OutOfRange {
                keyspace: self.name().to_string(),
                keyspace_id: keyspace_id.to_string(),
            });
        }
        Ok(index)
    }

    /// Name of the shard owning a keyspace id
    pub fn keyspace_id_to_shard_name(&self, role: &str, keyspace_id: &KeyspaceId) -> Result<String> {
        let index = self.keyspace_id_to_shard_index(role, keyspace_id)?;
        let name = self.shard_name_at(role, index)?;
        debug!(
            "Resolved keyspace id {} in {}/{} to shard {}",
            keyspace_id,
            self.name(),
            role,
            name
        );
        Ok(name)
    }
}
