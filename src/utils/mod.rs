//! Utility functions module
//!
//! This module contains console formatting, HTTP client construction,
//! retry logic, resource name generation and size helpers.

pub mod format;
pub mod helpers;
pub mod network;
pub mod retry;

pub use format::*;
pub use helpers::*;
pub use network::*;
pub use retry::*;
