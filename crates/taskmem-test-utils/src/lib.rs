//! Test helpers shared across taskmem crates.

pub mod memory;

pub use memory::{StubTaskMemory, action};
