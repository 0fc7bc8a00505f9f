//! Prompt hints built from recalled task memory.

use taskmem_memory::{MemoryMatch, TaskMemory};

/// Recall a similar past task and render it as a prompt hint.
///
/// Returns `None` when nothing in memory clears the threshold.
pub fn memory_hint(
    memory: &dyn TaskMemory,
    task: &str,
    threshold: Option<f64>,
) -> Option<String> {
    memory
        .recall(task, threshold)
        .map(|found| format_memory_hint(&found))
}

/// Format a recalled record for injection into the agent prompt.
pub fn format_memory_hint(found: &MemoryMatch) -> String {
    let mut lines = vec![format!(
        "Similar past task (score {:.2}): {}",
        found.score, found.record.task
    )];
    if found.record.actions.is_empty() {
        lines.push("No actions were recorded for it.".to_string());
    } else {
        lines.push("Actions taken:".to_string());
        for (step, action) in found.record.actions.iter().enumerate() {
            lines.push(format!("{}. {action}", step + 1));
        }
    }
    lines.join("\n")
}
