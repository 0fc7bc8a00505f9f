//! Memory record model used by the store and retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One opaque action emitted by the agent. Never inspected by this crate.
///
/// Agents normally emit JSON objects, but any JSON value is carried through so
/// files written by other tooling always load.
pub type Action = serde_json::Value;

/// Persisted record of one completed task execution.
///
/// Field names are part of the on-disk format and must stay `task`, `actions`
/// and `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Task description the run was started with.
    pub task: String,
    /// Actions the agent performed, in order.
    pub actions: Vec<Action>,
    /// Creation time in UNIX seconds.
    pub timestamp: f64,
}

impl MemoryRecord {
    /// Build a record stamped with the current time.
    pub fn new(task: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            task: task.into(),
            actions,
            timestamp: unix_seconds(Utc::now()),
        }
    }

    /// Creation time as a UTC datetime, if the stored timestamp is representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if !self.timestamp.is_finite() {
            return None;
        }
        let secs = self.timestamp.floor();
        let nanos = ((self.timestamp - secs) * 1_000_000_000.0) as u32;
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    }
}

/// A recalled record together with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMatch {
    /// The best matching past execution.
    pub record: MemoryRecord,
    /// Jaccard score in `[0, 1]`.
    pub score: f64,
}

/// Convert a datetime to fractional UNIX seconds.
pub(crate) fn unix_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}
