//! relay-server
//!
//! Multi-client async WebSocket relay for cursor events and the
//! shared toggle grid.

pub mod broadcast;
pub mod config;
pub mod registry;
pub mod router;
pub mod server;
pub mod types;

// internal module, not re-exported
mod client;

pub use broadcast::{Broadcaster, FanOut};
pub use registry::ClientRegistry;
pub use router::Router;
pub use types::{ClientId, Peer};
