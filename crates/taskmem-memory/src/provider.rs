//! Memory interface consumed by the agent layer.

use crate::model::{Action, MemoryMatch};

/// Task memory abstraction used by agents before and after a run.
///
/// Neither method can fail from the caller's point of view: implementations
/// degrade to "no memory" instead of returning errors.
pub trait TaskMemory: Send + Sync {
    /// Record a completed execution.
    fn record_execution(&self, task: &str, actions: Vec<Action>);

    /// Recall the most similar past execution for `task`.
    ///
    /// `threshold` overrides the implementation's default minimum score.
    fn recall(&self, task: &str, threshold: Option<f64>) -> Option<MemoryMatch>;
}
