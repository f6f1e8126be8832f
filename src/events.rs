//! Operation-based view of the dictionary.
//!
//! Besides full-state merges, a replica can ship the individual mutations it
//! performed. Each [`DictOp`] is a self-contained event that can be appended
//! to a log, broadcast, and replayed on any replica in any order.

use alloc::vec::Vec;

use crate::item::Item;
use crate::Crdt;

/// A CRDT that can express its mutations as discrete operations.
///
/// For convergence, `apply_op` must be:
/// - **Commutative**: order of operations doesn't matter
/// - **Idempotent**: applying the same op twice has no additional effect
pub trait OpCrdt: Crdt {
    /// The operation type this CRDT produces.
    type Op;

    /// Apply an operation to the current state.
    fn apply_op(&mut self, op: &Self::Op);
}

/// A single dictionary mutation.
///
/// # Example
///
/// ```
/// use lww_dict::events::{DictOp, OpCrdt};
/// use lww_dict::prelude::*;
///
/// let log = vec![
///     DictOp::delete("k".to_string(), 3),
///     DictOp::put("k".to_string(), "v", 2),
/// ];
///
/// let mut replica = LWWDict::new();
/// for op in log.iter().rev() {
///     replica.apply_op(op);
/// }
/// assert!(!replica.contains_key(&"k".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DictOp<K> {
    /// Write `item` under `key`.
    Put {
        /// Target key.
        key: K,
        /// Timestamped value.
        item: Item,
    },
    /// Record a tombstone for `key`.
    Delete {
        /// Target key.
        key: K,
        /// Deletion timestamp.
        timestamp: u64,
    },
}

impl<K> DictOp<K> {
    /// Build a put operation.
    pub fn put(key: K, value: impl Into<Vec<u8>>, timestamp: u64) -> Self {
        Self::Put {
            key,
            item: Item::new(timestamp, value),
        }
    }

    /// Build a delete operation.
    pub fn delete(key: K, timestamp: u64) -> Self {
        Self::Delete { key, timestamp }
    }

    /// The key this operation targets.
    #[must_use]
    pub fn key(&self) -> &K {
        match self {
            Self::Put { key, .. } | Self::Delete { key, .. } => key,
        }
    }

    /// The logical timestamp carried by this operation.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Put { item, .. } => item.timestamp,
            Self::Delete { timestamp, .. } => *timestamp,
        }
    }
}
