//! CLI command implementations

pub mod cache;
pub mod config;
pub mod entrypoint;

pub use cache::execute as cache;
pub use config::execute as config;
pub use entrypoint::execute as entrypoint;
