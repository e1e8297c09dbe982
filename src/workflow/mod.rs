//! The provisioning workflow
//!
//! Creates an account, a capacity pool, NFSv3 and NFSv4.1 volumes, a snapshot
//! and a volume restored from it, resizes a volume, then optionally tears
//! everything down again in reverse order.

pub mod pipeline;
pub mod state;


pub use pipeline::Workflow;
pub use state::*;
