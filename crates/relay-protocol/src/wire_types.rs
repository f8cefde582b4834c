//! Wire-level shapes of the JSON text protocol.
//!
//! This module defines:
//! - the per-kind inbound schemas (`RawMouseMove`, `RawBoxClick`), with
//!   every field optional so the codec can tell *which* rule failed;
//! - the outbound [`Envelope`] exactly as clients see it.
//!
//! The actual decode/encode logic lives in `json_codec`.
//!
//! ```text
//! Inbound (client → server)
//! -------------------------
//! {"type":"mousemove","x":<number>,"y":<number>,"additionalData":<any>}
//! {"type":"boxclick","index":<integer>,"additionalData":<any>}
//!
//! Outbound broadcast (server → every other client)
//! ------------------------------------------------
//! {"status":"success","type":"mousemove","x":..,"y":..,"additionalData":..,"source":".."}
//! {"status":"success","type":"boxclick","index":..,"additionalData":..,"source":"..","newValue":0|1}
//!
//! Outbound error (server → sender only)
//! -------------------------------------
//! {"status":"error","message":".."}
//! ```

use relay_core::{OutboundEvent, RelayError};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Name of the discriminator field on inbound frames.
pub const TYPE_FIELD: &str = "type";

/// `mousemove` as it arrives. JSON `null` deserializes to `None`,
/// so a null field counts as missing.
#[derive(Debug, Default, Deserialize)]
pub struct RawMouseMove {
    pub x: Option<Value>,
    pub y: Option<Value>,
    #[serde(rename = "additionalData")]
    pub additional_data: Option<Value>,
}

/// `boxclick` as it arrives.
#[derive(Debug, Default, Deserialize)]
pub struct RawBoxClick {
    pub index: Option<Value>,
    #[serde(rename = "additionalData")]
    pub additional_data: Option<Value>,
}

/// Outbound frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    /// Relayed event; `source` identifies the originating client.
    Success(EventBody),

    /// Rejection of the sender's own frame.
    Error { message: String },
}

/// Type-specific part of a success envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventBody {
    MouseMove {
        x: Number,
        y: Number,
        #[serde(rename = "additionalData")]
        additional_data: Value,
        source: String,
    },

    BoxClick {
        index: i64,
        #[serde(rename = "additionalData")]
        additional_data: Value,
        source: String,
        #[serde(rename = "newValue")]
        new_value: u8,
    },
}

impl Envelope {
    /// Wrap a relayed event, tagging it with the originator's provenance.
    pub fn event(event: OutboundEvent, source: impl Into<String>) -> Self {
        let source = source.into();
        let body = match event {
            OutboundEvent::MouseMove {
                x,
                y,
                additional_data,
            } => EventBody::MouseMove {
                x,
                y,
                additional_data,
                source,
            },
            OutboundEvent::BoxClick {
                index,
                additional_data,
                new_value,
            } => EventBody::BoxClick {
                index,
                additional_data,
                source,
                new_value,
            },
        };
        Envelope::Success(body)
    }

    /// Error reply carrying the client-facing text for `err`.
    pub fn error(err: &RelayError) -> Self {
        Envelope::Error {
            message: err.client_message().to_string(),
        }
    }
}
