//! relay-protocol
//!
//! Wire-level encoding/decoding for the relay.
//!
//! This crate turns inbound text frames into validated
//! `relay_core::InboundMessage`s and turns outbound [`Envelope`]s
//! back into text.
//!
//! - [`wire_types`] : JSON shapes (inbound schemas, outbound envelope)
//! - [`json_codec`] : validation + encode/decode

pub mod wire_types;
pub mod json_codec;

pub use wire_types::{Envelope, EventBody};

pub use json_codec::{
    decode_inbound,
    encode_envelope,
};
