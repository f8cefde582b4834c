//! relay-core
//!
//! Pure relay logic:
//! - messages (inbound/outbound types)
//! - the shared toggle grid
//! - the per-message error taxonomy

pub mod error;
pub mod grid;
pub mod messages;

pub use error::{GridError, RelayError};
pub use grid::{ToggleGrid, GRID_SIZE};

pub use messages::{
    BoxClick,
    InboundMessage,
    MessageKind,
    MouseMove,
    OutboundEvent,
};
