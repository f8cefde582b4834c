//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections, up to `max_clients`. A slot is
//!   reserved at accept time and held until the client task ends, so
//!   handshakes still in flight count against the cap.
//! - Assigns each connection a `ClientId`.
//! - Spawns a per-client task that performs the WebSocket handshake
//!   and then runs the client loop.
//!
//! The grid and the registry are created once here and shared with
//! every client task through the [`Router`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use relay_core::ToggleGrid;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{info, warn};

use crate::client;
use crate::config::Config;
use crate::registry::ClientRegistry;
use crate::router::Router;
use crate::types::ClientId;

/// A bound, not yet serving, relay.
pub struct RelayServer {
    listener: TcpListener,
    router: Router,
    max_clients: usize,
    slots: Arc<Semaphore>,
    next_client_id: AtomicU64,
}

/// Bind the listener and build the shared services.
pub async fn bind(config: &Config) -> anyhow::Result<RelayServer> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    let grid = Arc::new(ToggleGrid::new());
    let registry = Arc::new(ClientRegistry::new());

    Ok(RelayServer {
        listener,
        router: Router::new(grid, registry),
        max_clients: config.max_clients,
        slots: Arc::new(Semaphore::new(config.max_clients.min(Semaphore::MAX_PERMITS))),
        next_client_id: AtomicU64::new(1),
    })
}

/// Bind and serve until the listener fails.
pub async fn run(config: Config) -> anyhow::Result<()> {
    bind(&config).await?.serve().await
}

impl RelayServer {
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the shared services, e.g. for inspecting the grid.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Accept connections forever.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.local_addr()?;
        info!(addr = %addr, max_clients = self.max_clients, "relay listening");

        loop {
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };

            let slot = match Arc::clone(&self.slots).try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    warn!(
                        peer = %peer_addr,
                        max_clients = self.max_clients,
                        "rejecting connection: max_clients reached"
                    );
                    // Just drop the stream; client will see the connection closed.
                    continue;
                }
            };

            let client_id = self.next_client_id();
            info!(client_id = %client_id, peer = %peer_addr, "accepted connection");

            let router = self.router.clone();
            tokio::spawn(async move {
                handshake_and_run(client_id, peer_addr, stream, router, slot).await;
            });
        }
    }

    fn next_client_id(&self) -> ClientId {
        ClientId(self.next_client_id.fetch_add(1, Ordering::Relaxed))
    }
}

async fn handshake_and_run(
    client_id: ClientId,
    peer_addr: SocketAddr,
    stream: TcpStream,
    router: Router,
    _slot: OwnedSemaphorePermit,
) {
    // `_slot` is released when this task returns, handshake failure included.
    match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => client::run_client(client_id, peer_addr, ws, router).await,
        Err(e) => warn!(client_id = %client_id, peer = %peer_addr, error = %e, "websocket handshake failed"),
    }
}
