//! Retention policy for the record list.

/// Bound on how many records the store keeps.
///
/// The default keeps everything; the record list then grows without limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryRetentionPolicy {
    /// Maximum records to keep; oldest records are dropped first.
    pub max_records: Option<usize>,
}

impl MemoryRetentionPolicy {
    /// Keep at most `max_records` of the newest records.
    pub fn bounded(max_records: usize) -> Self {
        Self {
            max_records: Some(max_records),
        }
    }

    /// Number of leading records to drop from a list of `len` records.
    pub(crate) fn overflow(&self, len: usize) -> usize {
        match self.max_records {
            Some(max) => len.saturating_sub(max),
            None => 0,
        }
    }
}
