//! Handoff - container entry point and cache-reset worker
//!
//! The entry point provisions an unprivileged account, fixes ownership of
//! the application directories and replaces itself with the workload running
//! as that account. The worker wipes every cache bucket when a new version
//! activates.

#[cfg(not(unix))]
compile_error!("handoff requires a Unix target");

pub mod accounts;
pub mod cli;
pub mod config;
pub mod entrypoint;
pub mod error;
pub mod worker;

pub use error::{HandoffError, HandoffResult};
