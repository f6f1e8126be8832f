/// Core trait for state-based replicated types.
///
/// A replica merges the full (or partial) state of another replica into its
/// own. After every replica has seen every other replica's state, all of
/// them hold the same value, no matter in which order, or how many times,
/// the states were delivered.
///
/// # Properties
///
/// All implementations must satisfy:
/// - **Commutativity:** `a.merge(b) == b.merge(a)`
/// - **Associativity:** `a.merge(b.merge(c)) == a.merge(b).merge(c)`
/// - **Idempotency:** `a.merge(a) == a`
pub trait Crdt {
    /// Merge another replica's state into this one.
    ///
    /// After merging, `self` contains the least upper bound of both states.
    fn merge(&mut self, other: &Self);
}

/// Extension trait for delta-state replication.
///
/// Instead of shipping the full state, a replica computes the part of its
/// state the receiver is missing and ships only that.
///
/// # Example
///
/// ```
/// use lww_dict::prelude::*;
///
/// let mut a = LWWDict::new();
/// a.put("x".to_string(), "1", 1);
/// a.put("y".to_string(), "2", 2);
///
/// let mut b = LWWDict::new();
/// b.put("x".to_string(), "1", 1);
///
/// // Only `y` travels.
/// let delta = a.delta(&b);
/// assert_eq!(delta.len(), 1);
///
/// b.apply_delta(&delta);
/// assert_eq!(a, b);
/// ```
pub trait DeltaCrdt: Crdt {
    /// The type of delta produced by this CRDT.
    type Delta;

    /// Generate a delta containing changes in `self` that `other` does not have.
    fn delta(&self, other: &Self) -> Self::Delta;

    /// Apply a delta to this replica's state.
    ///
    /// Equivalent to merging the state that produced the delta.
    fn apply_delta(&mut self, delta: &Self::Delta);
}
