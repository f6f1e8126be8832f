//! Extension point for tombstone garbage collection.
//!
//! The dictionary keeps every tombstone forever. Deciding when a tombstone
//! can be dropped requires knowing that every replica has already observed
//! it, which is knowledge only the replication layer has. That layer plugs
//! in here through [`TombstoneCollector`] and calls
//! [`LWWDict::compact`](crate::LWWDict::compact).
//!
//! ```
//! use lww_dict::compaction::Horizon;
//! use lww_dict::prelude::*;
//!
//! let mut d = LWWDict::new();
//! d.put("a".to_string(), "1", 1);
//! d.delete("a".to_string(), 2);
//!
//! // Every replica has acknowledged state up to timestamp 2.
//! assert_eq!(d.compact(&Horizon(2)), 1);
//! assert!(d.delete_state().is_empty());
//! ```

/// Decides which tombstones may be physically removed.
pub trait TombstoneCollector<K> {
    /// Return `true` to drop the tombstone for `key` recorded at `tombstone`.
    fn collect(&self, key: &K, tombstone: u64) -> bool;
}

impl<K, F> TombstoneCollector<K> for F
where
    F: Fn(&K, u64) -> bool,
{
    fn collect(&self, key: &K, tombstone: u64) -> bool {
        self(key, tombstone)
    }
}

/// Collects every tombstone at or below a stability horizon.
///
/// The horizon is the greatest timestamp known to be held by all replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Horizon(pub u64);

impl<K> TombstoneCollector<K> for Horizon {
    fn collect(&self, _key: &K, tombstone: u64) -> bool {
        tombstone <= self.0
    }
}
