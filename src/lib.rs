//! anf-sample - Azure NetApp Files provisioning sample
//!
//! Creates an account, capacity pool, volumes and snapshots through the
//! Azure Resource Manager REST API, with helpers for parsing and
//! classifying NetApp resource ids.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod netapp;
pub mod uri;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use error::{AnfError, Result};
