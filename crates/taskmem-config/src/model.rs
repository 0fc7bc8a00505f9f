//! Configuration schema for taskmem.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage file used when `memory.path` is unset.
pub const DEFAULT_MEMORY_FILE: &str = "agent_memory.json";

/// Root config.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TaskmemConfig {
    #[serde(default, rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Task memory settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Disable to run agents without recall or recording.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Storage file; relative paths resolve against the working directory.
    #[serde(default)]
    pub path: Option<String>,
    /// Minimum Jaccard score for a recalled task.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Optional cap on stored records. Unbounded when unset.
    #[serde(default)]
    pub max_records: Option<usize>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: None,
            threshold: default_threshold(),
            max_records: None,
        }
    }
}

impl MemoryConfig {
    /// Storage path for this config, resolved against `cwd`.
    pub fn resolve_path(&self, cwd: &Path) -> PathBuf {
        let path = self.path.as_deref().unwrap_or(DEFAULT_MEMORY_FILE);
        cwd.join(path)
    }
}

fn default_enabled() -> bool {
    true
}

/// Default minimum recall score.
fn default_threshold() -> f64 {
    0.5
}
