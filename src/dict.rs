use alloc::collections::btree_map::{self, BTreeMap};
use alloc::string::String;
use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::bias::Bias;
use crate::compaction::TombstoneCollector;
use crate::events::{DictOp, OpCrdt};
use crate::item::Item;
use crate::{Crdt, DeltaCrdt};

/// A state-based last-writer-wins element dictionary (LWW-Element-Dictionary).
///
/// The dictionary keeps two grow-only maps: the greatest [`Item`] ever put
/// for each key, and the greatest deletion timestamp ever recorded for each
/// key. Whether a key is visible is decided on read by comparing the two,
/// with [`Bias`] breaking exact ties. Both maps only move upward, which makes
/// [`merge`](Crdt::merge) a join: replicas that exchange state in any order,
/// any number of times, end up identical.
///
/// Timestamps are opaque logical clock values supplied by the caller.
/// Generating them (for instance, advancing a local counter past every
/// timestamp seen during a merge) is the caller's job.
///
/// A single instance is not synchronized. Wrap a shared instance in a lock or
/// hand it to a single owner; independent replicas need no coordination.
///
/// # Example
///
/// ```
/// use lww_dict::prelude::*;
///
/// let mut a = LWWDict::new();
/// a.put("color".to_string(), "red", 1);
///
/// let mut b = LWWDict::new();
/// b.put("color".to_string(), "blue", 2);
/// b.delete("size".to_string(), 2);
///
/// a.merge(&b);
/// b.merge(&a);
///
/// assert_eq!(a, b);
/// assert_eq!(a.get(&"color".to_string()).value(), Some(&b"blue"[..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "K: serde::Serialize",
        deserialize = "K: Ord + serde::Deserialize<'de>"
    ))
)]
pub struct LWWDict<K: Ord + Clone = String> {
    puts: BTreeMap<K, Item>,
    deletes: BTreeMap<K, u64>,
    bias: Bias,
}

/// Result of [`LWWDict::get`].
///
/// A key that is not visible is ordinary data, not an error: it was either
/// never written or its latest tombstone hides its latest put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The key was never put.
    Absent,
    /// The key was put but a tombstone hides it.
    Deleted {
        /// Timestamp of the winning tombstone.
        timestamp: u64,
    },
    /// The key is visible.
    Live {
        /// Current value.
        value: &'a [u8],
        /// Timestamp of the winning put.
        timestamp: u64,
    },
}

impl<'a> Lookup<'a> {
    /// The visible value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&'a [u8]> {
        match *self {
            Lookup::Live { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The timestamp that decided this result; `0` when the key is absent.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        match *self {
            Lookup::Absent => 0,
            Lookup::Deleted { timestamp } | Lookup::Live { timestamp, .. } => timestamp,
        }
    }

    /// Whether the key is visible.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Live { .. })
    }
}

impl<K: Ord + Clone> LWWDict<K> {
    /// Create an empty dictionary that favors deletes on timestamp ties.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bias(Bias::default())
    }

    /// Create an empty dictionary with an explicit tie-break bias.
    #[must_use]
    pub fn with_bias(bias: Bias) -> Self {
        Self {
            puts: BTreeMap::new(),
            deletes: BTreeMap::new(),
            bias,
        }
    }

    /// Rebuild a dictionary from previously exported state.
    ///
    /// Together, the two maps and the bias are the complete replica state.
    #[must_use]
    pub fn from_parts(puts: BTreeMap<K, Item>, deletes: BTreeMap<K, u64>, bias: Bias) -> Self {
        Self {
            puts,
            deletes,
            bias,
        }
    }

    /// Split the dictionary into its put-state, delete-state and bias.
    #[must_use]
    pub fn into_parts(self) -> (BTreeMap<K, Item>, BTreeMap<K, u64>, Bias) {
        (self.puts, self.deletes, self.bias)
    }

    /// The tie-break bias of this replica.
    #[must_use]
    pub fn bias(&self) -> Bias {
        self.bias
    }

    /// Write `value` under `key` at `timestamp`.
    ///
    /// The first write for a key always lands. Later writes land only if
    /// `(timestamp, value)` is greater than the stored item, comparing
    /// timestamps first and value bytes on ties. Returns `true` if the stored
    /// item changed.
    pub fn put(&mut self, key: K, value: impl Into<Vec<u8>>, timestamp: u64) -> bool {
        self.put_item(key, Item::new(timestamp, value))
    }

    fn put_item(&mut self, key: K, item: Item) -> bool {
        match self.puts.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(item);
                true
            }
            btree_map::Entry::Occupied(mut slot) => {
                if item > *slot.get() {
                    slot.insert(item);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a tombstone for `key` at `timestamp`.
    ///
    /// Keeps the greatest deletion timestamp seen for the key and never
    /// touches the put-state. Returns `true` if the stored tombstone changed.
    pub fn delete(&mut self, key: K, timestamp: u64) -> bool {
        match self.deletes.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(timestamp);
                true
            }
            btree_map::Entry::Occupied(mut slot) => {
                if timestamp > *slot.get() {
                    slot.insert(timestamp);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Look up the visible state of `key`.
    ///
    /// A tombstone hides the stored put if it is newer, or if it carries the
    /// same timestamp and the bias favors deletes.
    #[must_use]
    pub fn get(&self, key: &K) -> Lookup<'_> {
        let Some(item) = self.puts.get(key) else {
            return Lookup::Absent;
        };
        match self.deletes.get(key) {
            Some(&deleted_at) if self.bias.is_deleted(item.timestamp, deleted_at) => {
                Lookup::Deleted {
                    timestamp: deleted_at,
                }
            }
            _ => Lookup::Live {
                value: &item.value,
                timestamp: item.timestamp,
            },
        }
    }

    /// Whether `key` is currently visible.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_present()
    }

    /// Iterate over visible `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[u8])> {
        self.puts
            .keys()
            .filter_map(move |key| self.get(key).value().map(|value| (key, value)))
    }

    /// Number of visible keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no key is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Snapshot of the visible contents, without timestamps or tombstones.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<K, Vec<u8>> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.to_vec()))
            .collect()
    }

    /// The winning item per key, including keys hidden by tombstones.
    #[must_use]
    pub fn put_state(&self) -> &BTreeMap<K, Item> {
        &self.puts
    }

    /// The greatest deletion timestamp per key.
    #[must_use]
    pub fn delete_state(&self) -> &BTreeMap<K, u64> {
        &self.deletes
    }

    /// Iterate over recorded tombstones.
    pub fn tombstones(&self) -> impl Iterator<Item = (&K, u64)> {
        self.deletes.iter().map(|(key, &ts)| (key, ts))
    }

    /// Merge a remote state that may not exist.
    ///
    /// `None` is a no-op.
    pub fn merge_from(&mut self, other: Option<&Self>) {
        if let Some(other) = other {
            self.merge(other);
        }
    }

    /// Physically drop keys whose tombstone the collector approves.
    ///
    /// Only keys that are currently hidden by their tombstone are considered;
    /// both the put and the tombstone are removed. Dropping a tombstone that
    /// some replica has not yet observed lets the deleted value come back on
    /// the next merge, so `collector` must only approve tombstones every
    /// replica already holds. Returns the number of keys removed.
    pub fn compact<C: TombstoneCollector<K> + ?Sized>(&mut self, collector: &C) -> usize {
        let bias = self.bias;
        let puts = &self.puts;
        let doomed: Vec<K> = self
            .deletes
            .iter()
            .filter(|&(key, &deleted_at)| {
                let hidden = match puts.get(key) {
                    Some(item) => bias.is_deleted(item.timestamp, deleted_at),
                    None => true,
                };
                hidden && collector.collect(key, deleted_at)
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            self.deletes.remove(key);
            self.puts.remove(key);
        }

        debug!(
            collected = doomed.len(),
            remaining = self.deletes.len(),
            "compacted tombstones"
        );
        doomed.len()
    }
}

impl<K: Ord + Clone> Default for LWWDict<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> Crdt for LWWDict<K> {
    fn merge(&mut self, other: &Self) {
        let mut changed = 0usize;
        for (key, item) in &other.puts {
            if self.put_item(key.clone(), item.clone()) {
                changed += 1;
            }
        }
        for (key, &ts) in &other.deletes {
            if self.delete(key.clone(), ts) {
                changed += 1;
            }
        }
        trace!(
            puts = other.puts.len(),
            deletes = other.deletes.len(),
            changed,
            "merged remote state"
        );
    }
}

/// Delta for [`LWWDict`]: puts and tombstones where `self` is ahead of `other`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "K: serde::Serialize",
        deserialize = "K: Ord + serde::Deserialize<'de>"
    ))
)]
pub struct LWWDictDelta<K: Ord + Clone = String> {
    puts: BTreeMap<K, Item>,
    deletes: BTreeMap<K, u64>,
}

impl<K: Ord + Clone> LWWDictDelta<K> {
    /// Number of put and tombstone entries carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.puts.len() + self.deletes.len()
    }

    /// Whether the delta carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }

    /// Puts carried by the delta.
    #[must_use]
    pub fn puts(&self) -> &BTreeMap<K, Item> {
        &self.puts
    }

    /// Tombstones carried by the delta.
    #[must_use]
    pub fn deletes(&self) -> &BTreeMap<K, u64> {
        &self.deletes
    }
}

impl<K: Ord + Clone> DeltaCrdt for LWWDict<K> {
    type Delta = LWWDictDelta<K>;

    fn delta(&self, other: &Self) -> LWWDictDelta<K> {
        let puts = self
            .puts
            .iter()
            .filter(|&(key, item)| other.puts.get(key).map_or(true, |theirs| item > theirs))
            .map(|(key, item)| (key.clone(), item.clone()))
            .collect();
        let deletes = self
            .deletes
            .iter()
            .filter(|&(key, &ts)| other.deletes.get(key).map_or(true, |&theirs| ts > theirs))
            .map(|(key, &ts)| (key.clone(), ts))
            .collect();
        LWWDictDelta { puts, deletes }
    }

    fn apply_delta(&mut self, delta: &LWWDictDelta<K>) {
        for (key, item) in &delta.puts {
            self.put_item(key.clone(), item.clone());
        }
        for (key, &ts) in &delta.deletes {
            self.delete(key.clone(), ts);
        }
        trace!(entries = delta.len(), "applied delta");
    }
}

impl<K: Ord + Clone> OpCrdt for LWWDict<K> {
    type Op = DictOp<K>;

    fn apply_op(&mut self, op: &DictOp<K>) {
        match op {
            DictOp::Put { key, item } => {
                self.put_item(key.clone(), item.clone());
            }
            DictOp::Delete { key, timestamp } => {
                self.delete(key.clone(), *timestamp);
            }
        }
    }
}

impl<K: Ord + Clone> Extend<DictOp<K>> for LWWDict<K> {
    fn extend<I: IntoIterator<Item = DictOp<K>>>(&mut self, iter: I) {
        for op in iter {
            match op {
                DictOp::Put { key, item } => {
                    self.put_item(key, item);
                }
                DictOp::Delete { key, timestamp } => {
                    self.delete(key, timestamp);
                }
            }
        }
    }
}
