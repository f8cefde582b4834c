//! Message types used by the relay core.
//!
//! These are **transport-agnostic** logical messages:
//! - [`InboundMessage`]: what a client sends, already validated.
//! - [`OutboundEvent`]: what gets fanned out to the other clients.
//!
//! Note: the JSON text codec lives in the `relay-protocol` crate;
//! this module is purely logical.

use serde_json::{Number, Value};

/// The closed set of message kinds the relay understands.
///
/// Anything else on the wire is rejected before it reaches the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    MouseMove,
    BoxClick,
}

impl MessageKind {
    /// Wire tag carried in the `type` field.
    pub fn tag(self) -> &'static str {
        match self {
            MessageKind::MouseMove => "mousemove",
            MessageKind::BoxClick => "boxclick",
        }
    }

    /// Exact, case-sensitive lookup of a wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "mousemove" => Some(MessageKind::MouseMove),
            "boxclick" => Some(MessageKind::BoxClick),
            _ => None,
        }
    }
}

/// A validated request from one client.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Cursor moved; relayed as-is.
    MouseMove(MouseMove),

    /// Toggle one grid cell.
    BoxClick(BoxClick),
}

impl InboundMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            InboundMessage::MouseMove(_) => MessageKind::MouseMove,
            InboundMessage::BoxClick(_) => MessageKind::BoxClick,
        }
    }
}

/// Cursor position (input).
#[derive(Debug, Clone, PartialEq)]
pub struct MouseMove {
    /// Kept as a JSON number so integers stay integers when echoed.
    pub x: Number,
    pub y: Number,

    /// Opaque client payload, relayed untouched.
    pub additional_data: Value,
}

/// Cell toggle request (input).
///
/// `index` is not range-checked here; the grid does that.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxClick {
    pub index: i64,
    pub additional_data: Value,
}

/// An event fanned out to every client except the one that caused it.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    MouseMove {
        x: Number,
        y: Number,
        additional_data: Value,
    },

    BoxClick {
        index: i64,
        additional_data: Value,
        /// Cell value right after this click's toggle.
        new_value: u8,
    },
}

impl OutboundEvent {
    pub fn kind(&self) -> MessageKind {
        match self {
            OutboundEvent::MouseMove { .. } => MessageKind::MouseMove,
            OutboundEvent::BoxClick { .. } => MessageKind::BoxClick,
        }
    }

    /// Relay a cursor move unchanged.
    pub fn mouse_move(msg: MouseMove) -> Self {
        OutboundEvent::MouseMove {
            x: msg.x,
            y: msg.y,
            additional_data: msg.additional_data,
        }
    }

    /// Report a click together with the value the cell now holds.
    pub fn box_click(msg: BoxClick, new_value: u8) -> Self {
        OutboundEvent::BoxClick {
            index: msg.index,
            additional_data: msg.additional_data,
            new_value,
        }
    }
}
