//! Cache-reset worker
//!
//! Models a background worker that, when a new version activates, deletes
//! every cache bucket regardless of which version created it and then takes
//! control of all open clients.
//!
//! # Lifecycle
//!
//! | Event | Effect |
//! |-------|--------|
//! | install | Skip waiting: activate as soon as installed |
//! | activate | Wipe all buckets (best effort), claim clients |
//!
//! Cache failures during activation are swallowed: activation is guaranteed,
//! clearing is not.

mod clients;
mod lifecycle;
mod storage;

pub use clients::{ClientRegistry, Clients, NoClients};
pub use lifecycle::{
    ActivateOutcome, EventOutcome, InstallOutcome, LifecycleEvent, ServiceWorker, WorkerState,
};
pub use storage::{Bucket, CacheStorage, DirCacheStorage, MemoryCacheStorage};
