//! Azure NetApp Files management module
//!
//! This module provides request models and validation, the ARM-backed
//! operations client, and the polling used while resources are removed.

pub mod models;
pub mod operations;
pub mod polling;

pub use models::*;
pub use operations::*;
pub use polling::*;
