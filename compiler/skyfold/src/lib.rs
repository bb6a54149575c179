//! skyfold CLI library.
//!
//! The binary in `main.rs` parses arguments and dispatches here so the
//! commands can be exercised from tests without spawning a process.

pub mod commands;
pub mod tracing_setup;

pub use commands::{CliError, OutputFormat};
