//! Error types for the relay core.
//!
//! Two layers:
//! - [`GridError`]: what the shared toggle grid can fail with.
//! - [`RelayError`]: the full per-message taxonomy the server reports
//!   back to a client. Every variant is recoverable; none of them
//!   closes the connection.

use thiserror::Error;

use crate::messages::MessageKind;

/// Failure from [`crate::ToggleGrid`] accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// Index outside `[0, len)`.
    #[error("cell index {index} out of range (grid has {len} cells)")]
    OutOfRange { index: i64, len: usize },
}

/// Everything that can go wrong while handling one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Payload was not well-formed JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// `type` absent or not one of the recognized tags.
    #[error("unknown message type")]
    UnknownType,

    /// A required field for the given message kind was absent (or unusable).
    #[error("missing fields for {0:?}")]
    MissingFields(MessageKind),

    /// Cell index not addressable in the grid.
    #[error("index out of range: {0}")]
    OutOfRange(String),

    /// Anything unanticipated while handling a single message.
    #[error("internal fault: {0}")]
    InternalFault(String),
}

impl RelayError {
    /// The exact text sent back to the client in an error envelope.
    ///
    /// Clients match on these strings, so they must not change.
    pub fn client_message(&self) -> &'static str {
        match self {
            RelayError::MalformedPayload(_) => "Invalid JSON format",
            RelayError::UnknownType => "Unknown message type",
            RelayError::MissingFields(MessageKind::BoxClick) => "Missing index or additionalData",
            RelayError::MissingFields(MessageKind::MouseMove) => {
                "Missing x, y coordinates or additionalData"
            }
            RelayError::OutOfRange(_) => "Index out of bounds",
            RelayError::InternalFault(_) => "Internal server error",
        }
    }
}

impl From<GridError> for RelayError {
    fn from(err: GridError) -> Self {
        RelayError::OutOfRange(err.to_string())
    }
}
