//! Command-line tool for inspecting and seeding task memory.

use anyhow::{Context, bail};
use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use log::debug;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use taskmem::config::{LayeredConfigOptions, TaskmemConfig};
use taskmem::memory::{Action, MemoryStore};
use taskmem::{format_memory_hint, init_logging, open_store};

/// Command-line options for the memory tool.
#[derive(Parser)]
#[command(name = "taskmem", version, about = "Inspect and seed agent task memory")]
struct Cli {
    /// Optional path to a taskmem.json5 config file applied over the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Memory file to use instead of the configured one
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a completed task and its actions
    Add {
        /// Task description
        #[arg(long)]
        task: String,
        /// Actions as a JSON array
        #[arg(long, default_value = "[]")]
        actions: String,
    },
    /// Show the most similar stored task
    Recall {
        /// Task description to match
        task: String,
        /// Minimum score, overriding the configured threshold
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// List stored tasks in insertion order
    List,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let stdout = io::stdout();
    run(cli, &cwd, &mut stdout.lock())
}

/// Execute one command. Memory failures are reported as warnings, never errors.
fn run(cli: Cli, cwd: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let layered = match &cli.config {
        Some(path) => TaskmemConfig::load_layered_with_options(
            LayeredConfigOptions::new(cwd).with_runtime_path(path),
        ),
        None => TaskmemConfig::load_layered(cwd),
    };
    let mut config = layered.context("failed to load config")?.config;
    if let Some(store) = &cli.store {
        config.memory.path = Some(store.to_string_lossy().to_string());
    }
    debug!("effective memory config: {:?}", config.memory);

    let Some(store) = open_store(&config.memory, cwd) else {
        bail!("task memory is disabled in config");
    };

    match cli.command {
        Command::Add { task, actions } => {
            let actions: Vec<Action> =
                serde_json::from_str(&actions).context("--actions must be a JSON array")?;
            store.add(&task, actions);
            if store.persist_failures() > 0 {
                writeln!(
                    out,
                    "warning: recorded in memory only, {} could not be written",
                    store.path().display()
                )?;
            }
        }
        Command::Recall { task, threshold } => {
            if threshold.is_some_and(|threshold| !(0.0..=1.0).contains(&threshold)) {
                bail!("--threshold must be between 0 and 1");
            }
            match store.find_best_match(&task, threshold) {
                Some(found) => writeln!(out, "{}", format_memory_hint(&found))?,
                None => writeln!(out, "no match")?,
            }
        }
        Command::List => print_records(&store, out)?,
    }
    Ok(())
}

fn print_records(store: &MemoryStore, out: &mut impl Write) -> io::Result<()> {
    for record in store.records() {
        let at = record
            .created_at()
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| record.timestamp.to_string());
        writeln!(out, "{at}\t{}", record.task)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, run};
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    /// Run the tool with `args` in `cwd`, returning the result and stdout.
    fn run_args(cwd: &Path, args: &[&str]) -> (anyhow::Result<()>, String) {
        let cli = Cli::try_parse_from(std::iter::once("taskmem").chain(args.iter().copied()))
            .expect("args");
        let mut out = Vec::new();
        let result = run(cli, cwd, &mut out);
        (result, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn recall_on_empty_store_prints_no_match() {
        let temp = tempdir().expect("tempdir");
        let (result, out) = run_args(temp.path(), &["recall", "buy eggs"]);
        result.expect("recall");
        assert_eq!(out, "no match\n");
    }

    #[test]
    fn add_then_recall_prints_the_plan() {
        let temp = tempdir().expect("tempdir");
        let (result, out) = run_args(
            temp.path(),
            &[
                "add",
                "--task",
                "search flights to Paris",
                "--actions",
                r#"[{"click_element":{"index":7}}]"#,
            ],
        );
        result.expect("add");
        assert_eq!(out, "");

        let (result, out) = run_args(temp.path(), &["recall", "search flights to London"]);
        result.expect("recall");
        assert_eq!(
            out,
            "Similar past task (score 0.60): search flights to Paris\n\
             Actions taken:\n\
             1. {\"click_element\":{\"index\":7}}\n"
        );

        let (result, out) = run_args(
            temp.path(),
            &["recall", "search flights to London", "--threshold", "0.7"],
        );
        result.expect("recall");
        assert_eq!(out, "no match\n");
    }

    #[test]
    fn threshold_outside_unit_range_is_rejected() {
        let temp = tempdir().expect("tempdir");
        for threshold in ["--threshold=1.5", "--threshold=-0.1"] {
            let (result, out) = run_args(temp.path(), &["recall", "buy eggs", threshold]);
            let err = result.expect_err("threshold");
            assert!(format!("{err}").contains("--threshold"));
            assert_eq!(out, "");
        }
    }

    #[test]
    fn store_flag_overrides_configured_path() {
        let temp = tempdir().expect("tempdir");
        let config = temp.path().join("cli.json5");
        fs::write(&config, r#"{ memory: { path: "configured.json" } }"#).expect("write");
        let store = temp.path().join("override.json");

        let (result, _) = run_args(
            temp.path(),
            &[
                "--config",
                config.to_str().expect("utf8"),
                "--store",
                store.to_str().expect("utf8"),
                "add",
                "--task",
                "open inbox",
            ],
        );
        result.expect("add");
        assert!(store.exists());
        assert!(!temp.path().join("configured.json").exists());
    }

    #[test]
    fn unwritable_store_warns_without_failing() {
        let temp = tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write");
        let store = blocker.join("memory.json");

        let (result, out) = run_args(
            temp.path(),
            &["--store", store.to_str().expect("utf8"), "add", "--task", "open inbox"],
        );
        result.expect("memory failures never fail the command");
        assert!(out.starts_with("warning: recorded in memory only"));
    }

    #[test]
    fn invalid_actions_json_is_a_cli_error() {
        let temp = tempdir().expect("tempdir");
        let (result, _) = run_args(
            temp.path(),
            &["add", "--task", "open inbox", "--actions", "{not json"],
        );
        assert!(result.is_err());
    }

    #[test]
    fn list_prints_tasks_in_insertion_order() {
        let temp = tempdir().expect("tempdir");
        for task in ["first task", "second task"] {
            run_args(temp.path(), &["add", "--task", task]).0.expect("add");
        }
        let (result, out) = run_args(temp.path(), &["list"]);
        result.expect("list");
        let tasks: Vec<&str> = out
            .lines()
            .map(|line| line.split('\t').nth(1).expect("task column"))
            .collect();
        assert_eq!(tasks, vec!["first task", "second task"]);
    }
}
