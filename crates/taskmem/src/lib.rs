//! Public SDK surface for taskmem.
//!
//! This crate re-exports the memory and config crates, wires a store up from
//! config, and renders recalled plans as prompt hints for the agent.

/// Re-export for convenience.
pub use taskmem_config as config;
/// Re-export for convenience.
pub use taskmem_memory as memory;

mod hint;
mod setup;

pub use hint::{format_memory_hint, memory_hint};
pub use setup::{open_store, store_options_from_config};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
