use parking_lot::Mutex;
use std::sync::Arc;
use taskmem_memory::{Action, MemoryMatch, TaskMemory};

/// Build an agent-style action: a single-key object naming the action.
pub fn action(name: &str, params: serde_json::Value) -> Action {
    serde_json::json!({ name: params })
}

/// In-memory `TaskMemory` that returns a fixed match and records every call.
#[derive(Clone, Default)]
pub struct StubTaskMemory {
    recall_match: Option<MemoryMatch>,
    recorded: Arc<Mutex<Vec<(String, Vec<Action>)>>>,
    recall_calls: Arc<Mutex<Vec<(String, Option<f64>)>>>,
}

impl StubTaskMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(recall_match: MemoryMatch) -> Self {
        Self {
            recall_match: Some(recall_match),
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<(String, Vec<Action>)> {
        self.recorded.lock().clone()
    }

    pub fn recall_calls(&self) -> Vec<(String, Option<f64>)> {
        self.recall_calls.lock().clone()
    }
}

impl TaskMemory for StubTaskMemory {
    fn record_execution(&self, task: &str, actions: Vec<Action>) {
        self.recorded.lock().push((task.to_string(), actions));
    }

    fn recall(&self, task: &str, threshold: Option<f64>) -> Option<MemoryMatch> {
        self.recall_calls.lock().push((task.to_string(), threshold));
        self.recall_match.clone()
    }
}
