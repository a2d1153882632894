//! Client control
//!
//! Claiming makes every open client use the active worker version
//! immediately instead of after a reload.

use crate::error::HandoffResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Claims open clients for the active worker
#[async_trait]
pub trait Clients: Send + Sync {
    /// Take control of all open clients, returning how many are controlled
    async fn claim(&self) -> HandoffResult<usize>;
}

/// Controller with no clients, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClients;

#[async_trait]
impl Clients for NoClients {
    async fn claim(&self) -> HandoffResult<usize> {
        Ok(0)
    }
}

/// In-memory registry of open clients and whether each is controlled
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<BTreeMap<String, bool>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an uncontrolled client (an open page from an older version)
    pub async fn connect(&self, id: &str) {
        self.clients.write().await.insert(id.to_string(), false);
    }

    pub async fn disconnect(&self, id: &str) {
        self.clients.write().await.remove(id);
    }

    pub async fn is_controlled(&self, id: &str) -> bool {
        self.clients.read().await.get(id).copied().unwrap_or(false)
    }

    /// Number of clients not yet controlled
    pub async fn uncontrolled(&self) -> usize {
        self.clients.read().await.values().filter(|c| !**c).count()
    }
}

#[async_trait]
impl Clients for ClientRegistry {
    async fn claim(&self) -> HandoffResult<usize> {
        let mut clients = self.clients.write().await;
        for controlled in clients.values_mut() {
            *controlled = true;
        }
        Ok(clients.len())
    }
}
