//! Building a memory store from config.

use log::info;
use std::path::Path;
use taskmem_config::MemoryConfig;
use taskmem_memory::{MemoryRetentionPolicy, MemoryStore, MemoryStoreOptions};

/// Translate memory config into store options.
pub fn store_options_from_config(config: &MemoryConfig) -> MemoryStoreOptions {
    MemoryStoreOptions {
        default_threshold: config.threshold,
        retention: MemoryRetentionPolicy {
            max_records: config.max_records,
        },
    }
}

/// Open the configured store, or `None` when memory is disabled.
///
/// Relative storage paths resolve against `cwd`.
pub fn open_store(config: &MemoryConfig, cwd: &Path) -> Option<MemoryStore> {
    if !config.enabled {
        info!("task memory disabled by config");
        return None;
    }
    let path = config.resolve_path(cwd);
    Some(MemoryStore::open_with(path, store_options_from_config(config)))
}
