//! Configuration management module
//!
//! Settings come from defaults, an optional TOML or JSON file, `ANF_*`
//! environment variables and finally command-line flags.

pub mod settings;

pub use settings::*;
