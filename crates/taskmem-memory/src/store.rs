//! File-backed task memory store.
//!
//! The whole record list is rewritten as pretty-printed JSON on every add. The
//! write goes to a sibling temp file first and is renamed into place, so the
//! file on disk is always a complete encoding of some record list.
//!
//! Load and persist failures are logged and swallowed. A successful `add` only
//! promises the record is in memory; durability is best effort and callers
//! must not assume it.

use crate::error::MemoryError;
use crate::model::{Action, MemoryMatch, MemoryRecord};
use crate::policy::MemoryRetentionPolicy;
use crate::provider::TaskMemory;
use crate::similarity::{self, DEFAULT_MATCH_THRESHOLD};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Storage file used when no path is configured.
pub const DEFAULT_STORAGE_FILE: &str = "agent_memory.json";

/// Tunables for a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryStoreOptions {
    /// Threshold used when a lookup does not supply one.
    pub default_threshold: f64,
    /// Optional bound on the record count.
    pub retention: MemoryRetentionPolicy,
}

impl Default for MemoryStoreOptions {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_MATCH_THRESHOLD,
            retention: MemoryRetentionPolicy::default(),
        }
    }
}

/// Ordered, lock-guarded list of past executions mirrored to one JSON file.
#[derive(Debug)]
pub struct MemoryStore {
    path: PathBuf,
    options: MemoryStoreOptions,
    records: RwLock<Vec<MemoryRecord>>,
    persist_failures: AtomicUsize,
}

impl MemoryStore {
    /// Open a store at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::open_with(path, MemoryStoreOptions::default())
    }

    /// Open a store at `path`, loading any records already stored there.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// logged and also yields an empty store; the next add overwrites it.
    pub fn open_with(path: impl AsRef<Path>, options: MemoryStoreOptions) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut records = match load_records(&path) {
            Ok(records) => records,
            Err(err) => {
                error!("failed to load memory (path={}): {err}", path.display());
                Vec::new()
            }
        };
        let overflow = options.retention.overflow(records.len());
        if overflow > 0 {
            warn!(
                "dropping oldest memory records on load (path={}, dropped={overflow})",
                path.display()
            );
            records.drain(..overflow);
        }
        info!(
            "opened memory store (path={}, records={})",
            path.display(),
            records.len()
        );
        Self {
            path,
            options,
            records: RwLock::new(records),
            persist_failures: AtomicUsize::new(0),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record for `task` and rewrite the backing file.
    ///
    /// Never fails. If the write does not succeed the record stays in memory
    /// and the failure is logged and counted in [`Self::persist_failures`].
    pub fn add(&self, task: &str, actions: Vec<Action>) {
        let record = MemoryRecord::new(task, actions);
        let mut records = self.records.write();
        records.push(record);

        let overflow = self.options.retention.overflow(records.len());
        if overflow > 0 {
            records.drain(..overflow);
            warn!("dropped oldest memory records (dropped={overflow})");
        }

        match write_records(&self.path, &records) {
            Ok(()) => info!("memory saved for task: {}", preview(task)),
            Err(err) => {
                self.persist_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    "failed to save memory, kept in memory only (path={}, task={}): {err}",
                    self.path.display(),
                    preview(task)
                );
            }
        }
    }

    /// Snapshot of every record in insertion order.
    pub fn records(&self) -> Vec<MemoryRecord> {
        self.records.read().clone()
    }

    /// Number of records held in memory.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Number of persist attempts that failed since the store was opened.
    pub fn persist_failures(&self) -> usize {
        self.persist_failures.load(Ordering::Relaxed)
    }

    /// Best match for `query`, using the store default when `threshold` is `None`.
    pub fn find_best_match(&self, query: &str, threshold: Option<f64>) -> Option<MemoryMatch> {
        let threshold = threshold.unwrap_or(self.options.default_threshold);
        let records = self.records.read();
        let Some(best) = similarity::find_best_match(query, &records, threshold) else {
            debug!(
                "no memory match (records={}, threshold={threshold})",
                records.len()
            );
            return None;
        };
        info!("memory recalled (score={:.2})", best.score);
        Some(MemoryMatch {
            record: best.record.clone(),
            score: best.score,
        })
    }
}

impl TaskMemory for MemoryStore {
    fn record_execution(&self, task: &str, actions: Vec<Action>) {
        self.add(task, actions);
    }

    fn recall(&self, task: &str, threshold: Option<f64>) -> Option<MemoryMatch> {
        self.find_best_match(task, threshold)
    }
}

/// Load all records from `path`; a missing file is an empty list.
fn load_records(path: &Path) -> Result<Vec<MemoryRecord>, MemoryError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("memory file missing, starting empty (path={})", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };
    let records: Vec<MemoryRecord> = serde_json::from_str(&contents)?;
    debug!(
        "loaded memory records (path={}, records={})",
        path.display(),
        records.len()
    );
    Ok(records)
}

/// Rewrite the record file atomically.
fn write_records(path: &Path, records: &[MemoryRecord]) -> Result<(), MemoryError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let encoded = serde_json::to_string_pretty(records)?;
    let temp_path = temp_path(path);
    {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_path)?;
        file.write_all(encoded.as_bytes())?;
        file.sync_all()?;
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    debug!(
        "persisted memory records (path={}, records={})",
        path.display(),
        records.len()
    );
    Ok(())
}

/// Sibling temp file used while rewriting `path`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(DEFAULT_STORAGE_FILE));
    name.push(".tmp");
    path.with_file_name(name)
}

/// First 50 characters of a task for log lines.
fn preview(task: &str) -> String {
    let mut preview: String = task.chars().take(50).collect();
    if task.chars().nth(50).is_some() {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, MemoryStoreOptions, preview, temp_path};
    use crate::MemoryRetentionPolicy;
    use log::{Level, Log, Metadata, Record};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Once};
    use std::thread::{self, ThreadId};
    use tempfile::tempdir;

    /// Collects log lines per thread so parallel tests do not see each other.
    struct CaptureLogger {
        lines: Mutex<Vec<(ThreadId, Level, String)>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            self.lines.lock().push((
                thread::current().id(),
                record.level(),
                record.args().to_string(),
            ));
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger {
        lines: Mutex::new(Vec::new()),
    };
    static INSTALL: Once = Once::new();

    /// Install the capturing logger and forget earlier lines from this thread.
    fn capture_logs() {
        INSTALL.call_once(|| {
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(log::LevelFilter::Trace);
        });
        let id = thread::current().id();
        LOGGER.lines.lock().retain(|(thread, _, _)| *thread != id);
    }

    fn logged_on_this_thread() -> Vec<(Level, String)> {
        let id = thread::current().id();
        LOGGER
            .lines
            .lock()
            .iter()
            .filter(|(thread, _, _)| *thread == id)
            .map(|(_, level, line)| (*level, line.clone()))
            .collect()
    }

    fn click(index: u64) -> crate::Action {
        json!({ "click_element": { "index": index } })
    }

    #[test]
    fn missing_file_opens_empty() {
        let temp = tempdir().expect("tempdir");
        let store = MemoryStore::open(temp.path().join("memory.json"));
        assert!(store.is_empty());
        assert!(store.find_best_match("anything", Some(0.0)).is_none());
    }

    #[test]
    fn corrupt_file_opens_empty_and_is_replaced_on_add() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memory.json");
        fs::write(&path, "{ not json").expect("write");

        let store = MemoryStore::open(&path);
        assert!(store.is_empty());

        store.add("open settings", vec![click(1)]);
        let reopened = MemoryStore::open(&path);
        assert_eq!(reopened.records(), store.records());
    }

    #[test]
    fn add_persists_pretty_json_array() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("memory.json");
        let store = MemoryStore::open(&path);
        store.add("open settings", vec![click(1), click(2)]);

        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.starts_with("[\n  {"));
        let value: serde_json::Value = serde_json::from_str(&contents).expect("json");
        assert_eq!(value[0]["task"], json!("open settings"));
        assert_eq!(value[0]["actions"][1], json!({ "click_element": { "index": 2 } }));
        assert!(value[0]["timestamp"].is_f64());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn failed_persist_keeps_record_in_memory() {
        let temp = tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write");
        let store = MemoryStore::open(blocker.join("memory.json"));

        store.add("search flights to Paris", Vec::new());

        assert_eq!(store.len(), 1);
        assert_eq!(store.persist_failures(), 1);
        let found = store
            .find_best_match("search flights to Paris", None)
            .expect("match");
        assert_eq!(found.score, 1.0);
    }

    #[test]
    fn failed_persist_is_not_reported_as_saved() {
        capture_logs();
        let temp = tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write");
        let store = MemoryStore::open(blocker.join("memory.json"));

        store.add("open settings", Vec::new());

        let lines = logged_on_this_thread();
        assert!(
            lines
                .iter()
                .any(|(level, line)| *level == Level::Error && line.contains("failed to save"))
        );
        assert!(!lines.iter().any(|(_, line)| line.contains("memory saved")));
    }

    #[test]
    fn successful_persist_is_reported_as_saved() {
        capture_logs();
        let temp = tempdir().expect("tempdir");
        let store = MemoryStore::open(temp.path().join("memory.json"));

        store.add("open settings", Vec::new());

        let lines = logged_on_this_thread();
        assert!(lines.iter().any(|(level, line)| {
            *level == Level::Info && line == "memory saved for task: open settings"
        }));
        assert!(!lines.iter().any(|(level, _)| *level == Level::Error));
    }

    #[test]
    fn non_object_actions_load_and_survive_add() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memory.json");
        fs::write(
            &path,
            r#"[
  {"task": "scroll the feed", "actions": ["click", 3, null, {"scroll_down": {}}], "timestamp": 1.5},
  {"task": "open settings", "actions": [], "timestamp": 2.5}
]"#,
        )
        .expect("write");

        let store = MemoryStore::open(&path);
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.records()[0].actions,
            vec![json!("click"), json!(3), json!(null), json!({ "scroll_down": {} })]
        );

        store.add("open inbox", vec![json!("done")]);
        let reopened = MemoryStore::open(&path);
        let tasks: Vec<String> = reopened.records().into_iter().map(|r| r.task).collect();
        assert_eq!(tasks, vec!["scroll the feed", "open settings", "open inbox"]);
    }

    #[test]
    fn retention_drops_oldest_records() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memory.json");
        let options = MemoryStoreOptions {
            retention: MemoryRetentionPolicy::bounded(2),
            ..MemoryStoreOptions::default()
        };
        let store = MemoryStore::open_with(&path, options);
        store.add("first", Vec::new());
        store.add("second", Vec::new());
        store.add("third", Vec::new());

        let tasks: Vec<String> = store.records().into_iter().map(|r| r.task).collect();
        assert_eq!(tasks, vec!["second".to_string(), "third".to_string()]);

        let reopened = MemoryStore::open_with(&path, options);
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn retention_applies_to_loaded_records() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memory.json");
        let store = MemoryStore::open(&path);
        for task in ["a", "b", "c"] {
            store.add(task, Vec::new());
        }
        let options = MemoryStoreOptions {
            retention: MemoryRetentionPolicy::bounded(1),
            ..MemoryStoreOptions::default()
        };
        let bounded = MemoryStore::open_with(&path, options);
        assert_eq!(bounded.records()[0].task, "c");
    }

    #[test]
    fn default_threshold_comes_from_options() {
        let temp = tempdir().expect("tempdir");
        let options = MemoryStoreOptions {
            default_threshold: 0.7,
            ..MemoryStoreOptions::default()
        };
        let store = MemoryStore::open_with(temp.path().join("memory.json"), options);
        store.add("search flights to Paris", Vec::new());
        assert!(store.find_best_match("search flights to London", None).is_none());
        assert!(
            store
                .find_best_match("search flights to London", Some(0.5))
                .is_some()
        );
    }

    #[test]
    fn concurrent_adds_are_all_persisted() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memory.json");
        let store = Arc::new(MemoryStore::open(&path));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for step in 0..10 {
                        store.add(&format!("worker {worker} step {step}"), vec![click(step)]);
                        let _ = store.find_best_match("worker step", Some(0.0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("join");
        }

        assert_eq!(store.len(), 80);
        let reopened = MemoryStore::open(&path);
        assert_eq!(reopened.records(), store.records());
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let path = Path::new("/data/agent_memory.json");
        assert_eq!(temp_path(path), Path::new("/data/agent_memory.json.tmp"));
    }

    #[test]
    fn preview_truncates_long_tasks() {
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(60);
        assert_eq!(preview(&long), format!("{}...", "x".repeat(50)));
    }
}
