//! JSON text codec.
//!
//! Converts between:
//! - one inbound text frame (`&str`) and a validated
//!   `relay_core::InboundMessage`;
//! - an outbound [`Envelope`] and the text frame sent to clients.
//!
//! Validation order, first failure wins:
//! 1. not JSON                         → `MalformedPayload`
//! 2. `type` missing / not recognized  → `UnknownType`
//! 3. required field missing           → `MissingFields`
//! 4. `index` not integer-like         → `OutOfRange`
//!
//! Range checking of `index` against the grid is *not* done here.

use relay_core::{BoxClick, InboundMessage, MessageKind, MouseMove, RelayError};
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

use crate::wire_types::{Envelope, RawBoxClick, RawMouseMove, TYPE_FIELD};

/// Decode and validate a single inbound text frame.
pub fn decode_inbound(text: &str) -> Result<InboundMessage, RelayError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| RelayError::MalformedPayload(e.to_string()))?;

    let kind = value
        .get(TYPE_FIELD)
        .and_then(Value::as_str)
        .and_then(MessageKind::from_tag)
        .ok_or(RelayError::UnknownType)?;

    match kind {
        MessageKind::MouseMove => decode_mouse_move(value),
        MessageKind::BoxClick => decode_box_click(value),
    }
}

/// Serialize an envelope into the text frame sent on the wire.
pub fn encode_envelope(envelope: &Envelope) -> Result<String, RelayError> {
    serde_json::to_string(envelope).map_err(|e| RelayError::InternalFault(e.to_string()))
}

fn decode_mouse_move(value: Value) -> Result<InboundMessage, RelayError> {
    let missing = || RelayError::MissingFields(MessageKind::MouseMove);
    let raw: RawMouseMove = schema(value, MessageKind::MouseMove)?;

    let x = raw.x.and_then(as_number).ok_or_else(missing)?;
    let y = raw.y.and_then(as_number).ok_or_else(missing)?;
    let additional_data = raw.additional_data.ok_or_else(missing)?;

    Ok(InboundMessage::MouseMove(MouseMove {
        x,
        y,
        additional_data,
    }))
}

fn decode_box_click(value: Value) -> Result<InboundMessage, RelayError> {
    let missing = || RelayError::MissingFields(MessageKind::BoxClick);
    let raw: RawBoxClick = schema(value, MessageKind::BoxClick)?;

    let index = raw.index.and_then(as_number).ok_or_else(missing)?;
    let additional_data = raw.additional_data.ok_or_else(missing)?;
    let index = integer_index(&index)?;

    Ok(InboundMessage::BoxClick(BoxClick {
        index,
        additional_data,
    }))
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

/// Deserialize into the per-kind schema. All fields are optional, so this
/// only fails on type mismatches serde itself cannot absorb.
fn schema<T: DeserializeOwned>(value: Value, kind: MessageKind) -> Result<T, RelayError> {
    serde_json::from_value(value).map_err(|_| RelayError::MissingFields(kind))
}

fn as_number(value: Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

/// Accept `5` and `5.0`; reject `5.5` and anything outside `i64`.
fn integer_index(n: &Number) -> Result<i64, RelayError> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }

    let out_of_range = || RelayError::OutOfRange(format!("index {} is not a cell index", n));

    // u64 above i64::MAX can never address a cell.
    if n.is_u64() {
        return Err(out_of_range());
    }

    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(out_of_range()),
    }
}
