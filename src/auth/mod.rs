//! Authentication module for Azure services
//!
//! This module loads service principal credentials from the Azure SDK auth
//! file and exposes them as access tokens for the Resource Manager API.

pub mod provider;

pub use provider::*;
