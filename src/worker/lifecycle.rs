//! Worker lifecycle: install, then activate with a full cache wipe

use crate::error::{HandoffError, HandoffResult};
use crate::worker::clients::Clients;
use crate::worker::storage::CacheStorage;
use futures_util::future::join_all;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Lifecycle state of a worker version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// Platform lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Install,
    Activate,
}

/// Result of the install phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    /// Activate without waiting for old-version clients to close
    pub skip_waiting: bool,
}

/// Result of the activate phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivateOutcome {
    /// Buckets removed
    pub deleted: usize,
    /// Clients now controlled
    pub claimed: usize,
    /// Swallowed cache failure, if any
    pub cache_error: Option<String>,
}

/// Outcome of a dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Installed(InstallOutcome),
    Activated(ActivateOutcome),
}

/// A worker version bound to a cache storage and a client controller
pub struct ServiceWorker<S, C> {
    caches: S,
    clients: C,
    state: WorkerState,
    skip_waiting: bool,
}

impl<S: CacheStorage, C: Clients> ServiceWorker<S, C> {
    pub fn new(caches: S, clients: C) -> Self {
        Self {
            caches,
            clients,
            state: WorkerState::Parsed,
            skip_waiting: false,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn skip_waiting(&self) -> bool {
        self.skip_waiting
    }

    pub fn caches(&self) -> &S {
        &self.caches
    }

    pub fn clients(&self) -> &C {
        &self.clients
    }

    /// Install phase: mark ready to activate immediately
    pub async fn install(&mut self) -> InstallOutcome {
        self.state = WorkerState::Installing;
        self.skip_waiting = true;
        self.state = WorkerState::Installed;
        debug!("Worker installed, skipping wait");
        InstallOutcome {
            skip_waiting: self.skip_waiting,
        }
    }

    /// Activate phase: wipe every bucket, then claim clients
    ///
    /// Always completes. Cache and claim failures are logged and reported in
    /// the outcome, never returned.
    pub async fn activate(&mut self) -> ActivateOutcome {
        self.state = WorkerState::Activating;

        let mut outcome = ActivateOutcome::default();
        match self.clear_all().await {
            Ok(deleted) => outcome.deleted = deleted,
            Err(e) => {
                debug!("Ignoring cache reset failure: {}", e);
                outcome.cache_error = Some(e.to_string());
            }
        }

        outcome.claimed = match self.clients.claim().await {
            Ok(n) => n,
            Err(e) => {
                debug!("Ignoring client claim failure: {}", e);
                0
            }
        };

        self.state = WorkerState::Activated;
        info!(
            "Worker activated: {} bucket(s) deleted, {} client(s) claimed",
            outcome.deleted, outcome.claimed
        );
        outcome
    }

    /// Delete every bucket concurrently
    ///
    /// All deletions run to completion; the first failure is returned.
    pub async fn clear_all(&self) -> HandoffResult<usize> {
        let names = self.caches.keys().await?;
        debug!("Deleting {} cache bucket(s)", names.len());

        let results = join_all(names.iter().map(|name| self.caches.delete(name))).await;

        let mut deleted = 0;
        let mut first_error: Option<HandoffError> = None;
        for result in results {
            match result {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => debug!("Additional cache delete failure: {}", e),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(deleted),
        }
    }

    /// Dispatch a lifecycle event
    ///
    /// An activation that arrives before install runs install first.
    pub async fn handle(&mut self, event: LifecycleEvent) -> EventOutcome {
        match event {
            LifecycleEvent::Install => EventOutcome::Installed(self.install().await),
            LifecycleEvent::Activate => {
                if self.state == WorkerState::Parsed {
                    self.install().await;
                }
                EventOutcome::Activated(self.activate().await)
            }
        }
    }

    /// Retire this version
    pub fn retire(&mut self) {
        self.state = WorkerState::Redundant;
    }
}
