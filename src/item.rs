use alloc::vec::Vec;

/// A timestamped value stored under a dictionary key.
///
/// Items are totally ordered: first by `timestamp`, then by the
/// byte-lexicographic order of `value`. The greatest item ever written for a
/// key is the one that survives, so two replicas that saw the same writes
/// always pick the same winner, even when timestamps collide.
///
/// ```
/// use lww_dict::Item;
///
/// assert!(Item::new(5, "a") < Item::new(9, "a"));
/// assert!(Item::new(5, "a") < Item::new(5, "b"));
/// assert!(Item::new(5, "ab") > Item::new(5, "a"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    /// Caller-supplied logical timestamp.
    pub timestamp: u64,
    /// Raw value bytes.
    pub value: Vec<u8>,
}

impl Item {
    /// Create an item from a timestamp and anything convertible to bytes.
    pub fn new(timestamp: u64, value: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            value: value.into(),
        }
    }
}
