//! Shared types for the relay server.
//!
//! This module defines:
//! - `ClientId`: a lightweight handle for connected clients
//! - channel aliases for each client's outbound text queue
//! - `Peer`: the registry's view of one live connection

use std::fmt;
use std::net::SocketAddr;

use tokio::sync::mpsc;

/// Identifier for a connected client.
///
/// This is intentionally opaque; we just guarantee uniqueness
/// over the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound text frames queued for a given client.
pub type OutboundTx = mpsc::UnboundedSender<String>;
pub type OutboundRx = mpsc::UnboundedReceiver<String>;

/// One live connection as seen by the registry and the router.
///
/// Cloning a `Peer` clones the sending half of its queue; the writer
/// task owning the receiving half stops once every clone is gone.
#[derive(Debug, Clone)]
pub struct Peer {
    id: ClientId,
    addr: SocketAddr,
    tx: OutboundTx,
}

impl Peer {
    pub fn new(id: ClientId, addr: SocketAddr, tx: OutboundTx) -> Self {
        Peer { id, addr, tx }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Value placed in `source` on events this peer originates.
    pub fn provenance(&self) -> String {
        self.addr.to_string()
    }

    /// Queue a text frame for this peer.
    ///
    /// Fails only when the peer's writer has gone away.
    pub fn send(&self, text: String) -> Result<(), mpsc::error::SendError<String>> {
        self.tx.send(text)
    }
}
