//! Task memory capture and similarity recall.
//!
//! A [`MemoryStore`] owns the ordered list of past task executions and keeps a
//! JSON copy of it on disk. Lookups score every stored task against the new one
//! with token-level Jaccard similarity and return the best match above a
//! threshold. Every storage failure is logged and swallowed: memory is an
//! optimization, so a broken store behaves like an empty one.

pub mod error;
pub mod model;
pub mod policy;
pub mod provider;
pub mod similarity;
pub mod store;

/// Memory error type.
pub use error::MemoryError;
/// Memory record model.
pub use model::{Action, MemoryMatch, MemoryRecord};
/// Retention policy.
pub use policy::MemoryRetentionPolicy;
/// Memory interface used by agents.
pub use provider::TaskMemory;
/// Similarity scoring.
pub use similarity::{DEFAULT_MATCH_THRESHOLD, ScoredRecord, find_best_match, jaccard, tokenize};
/// File-backed store.
pub use store::{DEFAULT_STORAGE_FILE, MemoryStore, MemoryStoreOptions};
