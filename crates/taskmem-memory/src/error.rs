//! Error types for memory persistence.

/// Errors raised while loading or persisting the record file.
///
/// These never cross the [`crate::MemoryStore`] boundary; the store logs them
/// and carries on in memory.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
