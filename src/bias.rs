/// Tie-break policy for a put and a delete carrying the same timestamp.
///
/// The bias is replica-local configuration, but every replica of the same
/// dictionary must use the same bias or their visible contents can differ
/// even after their states converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bias {
    /// A delete wins over a put with the same timestamp.
    #[default]
    Delete,
    /// A put wins over a delete with the same timestamp.
    Put,
}

impl Bias {
    /// Whether a put at `put_ts` is hidden by a tombstone at `delete_ts`.
    #[must_use]
    pub fn is_deleted(self, put_ts: u64, delete_ts: u64) -> bool {
        delete_ts > put_ts || (delete_ts == put_ts && self == Bias::Delete)
    }
}
