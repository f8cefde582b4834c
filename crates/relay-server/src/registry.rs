//! Registry of live connections.
//!
//! Membership is exactly the set of clients between accept and close.
//! Iteration holds the read lock and add/remove take the write lock, so
//! a peer being removed is never visited half-way through.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::types::{ClientId, Peer};

#[derive(Debug, Default)]
pub struct ClientRegistry {
    peers: RwLock<HashMap<ClientId, Peer>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        ClientRegistry::default()
    }

    /// Insert `peer`. Re-adding the same id replaces the old entry.
    pub async fn add(&self, peer: Peer) {
        let mut guard = self.peers.write().await;
        guard.insert(peer.id(), peer);
    }

    /// Remove `id` if present. Returns whether anything was removed.
    pub async fn remove(&self, id: ClientId) -> bool {
        let mut guard = self.peers.write().await;
        guard.remove(&id).is_some()
    }

    /// Apply `f` to every registered peer except `except`, in no
    /// particular order.
    ///
    /// `f` must not block: the read lock is held for the whole pass.
    pub async fn for_each_except<F>(&self, except: ClientId, mut f: F)
    where
        F: FnMut(&Peer),
    {
        let guard = self.peers.read().await;
        for peer in guard.values().filter(|p| p.id() != except) {
            f(peer);
        }
    }

    /// Number of registered peers. Diagnostics only.
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}
