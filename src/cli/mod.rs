//! CLI module for anf-sample
//!
//! Command definitions, argument parsing and command execution.

pub mod commands;

pub use commands::*;
