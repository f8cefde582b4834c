//! Per-message routing.
//!
//! The router owns handles to the shared grid and the registry and
//! drives one inbound frame through:
//!
//! ```text
//! text ─► decode_inbound ─► (boxclick: grid.toggle) ─► publish to others
//!              │                    │
//!              └──── error ─────────┴──► error envelope to sender only
//! ```
//!
//! Nothing that happens while handling one frame escapes this module:
//! every failure, a panic included, becomes an error reply and the
//! connection stays open.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use relay_core::{InboundMessage, OutboundEvent, RelayError, ToggleGrid};
use relay_protocol::{decode_inbound, encode_envelope, Envelope};
use tracing::{debug, error, trace};

use crate::broadcast::{Broadcaster, FanOut};
use crate::registry::ClientRegistry;
use crate::types::{ClientId, Peer};

/// Frame used if even the error envelope fails to encode.
const INTERNAL_ERROR_FRAME: &str = r#"{"status":"error","message":"Internal server error"}"#;

#[derive(Debug, Clone)]
pub struct Router {
    grid: Arc<ToggleGrid>,
    registry: Arc<ClientRegistry>,
    broadcaster: Broadcaster,
}

impl Router {
    pub fn new(grid: Arc<ToggleGrid>, registry: Arc<ClientRegistry>) -> Self {
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        Router {
            grid,
            registry,
            broadcaster,
        }
    }

    pub fn grid(&self) -> &ToggleGrid {
        &self.grid
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Connection became `Open`: make it eligible for broadcasts.
    /// Returns the number of connected clients afterwards.
    pub async fn open(&self, peer: Peer) -> usize {
        self.registry.add(peer).await;
        self.registry.len().await
    }

    /// Connection became `Closed`. Returns the number still connected.
    pub async fn close(&self, id: ClientId) -> usize {
        self.registry.remove(id).await;
        self.registry.len().await
    }

    /// Handle one inbound text frame from `origin`.
    ///
    /// Returns the frame to send back to `origin`, if any. Successful
    /// messages produce no reply; the sender never sees its own event.
    pub async fn handle_frame(&self, origin: &Peer, text: &str) -> Option<String> {
        let outcome = contain_faults(self.dispatch(origin, text)).await;
        reply_for(origin, outcome)
    }

    async fn dispatch(&self, origin: &Peer, text: &str) -> Result<FanOut, RelayError> {
        let event = match decode_inbound(text)? {
            InboundMessage::MouseMove(msg) => OutboundEvent::mouse_move(msg),
            InboundMessage::BoxClick(msg) => {
                // Toggle first so the broadcast reports the post-toggle bit.
                let new_value = self.grid.toggle(msg.index)?;
                OutboundEvent::box_click(msg, new_value)
            }
        };

        self.broadcaster.publish(origin, event).await
    }
}

/// Catch a panic in the per-message unit and turn it into `InternalFault`.
async fn contain_faults<F>(handling: F) -> Result<FanOut, RelayError>
where
    F: Future<Output = Result<FanOut, RelayError>>,
{
    AssertUnwindSafe(handling)
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(RelayError::InternalFault("panic while handling frame".into())))
}

/// Reply owed to `origin` for one handled frame, if any.
fn reply_for(origin: &Peer, outcome: Result<FanOut, RelayError>) -> Option<String> {
    match outcome {
        Ok(fan_out) => {
            trace!(
                client_id = %origin.id(),
                delivered = fan_out.delivered,
                failed = fan_out.failed,
                "relayed"
            );
            None
        }
        Err(err) => {
            match &err {
                RelayError::InternalFault(detail) => {
                    error!(client_id = %origin.id(), %detail, "internal fault handling frame")
                }
                other => debug!(client_id = %origin.id(), error = %other, "rejected frame"),
            }
            Some(error_frame(&err))
        }
    }
}

fn error_frame(err: &RelayError) -> String {
    encode_envelope(&Envelope::error(err)).unwrap_or_else(|_| INTERNAL_ERROR_FRAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;

    use crate::types::OutboundRx;

    async fn connect(router: &Router, id: u64) -> (Peer, OutboundRx) {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = format!("172.16.0.{}:7000", id).parse().unwrap();
        let peer = Peer::new(ClientId(id), addr, tx);
        router.open(peer.clone()).await;
        (peer, rx)
    }

    #[tokio::test]
    async fn panic_becomes_internal_server_error() {
        let outcome = contain_faults(async {
            let cells: Vec<u8> = Vec::new();
            let _ = cells[3];
            Ok(FanOut::default())
        })
        .await;
        assert!(matches!(outcome, Err(RelayError::InternalFault(_))));

        let (tx, _rx) = mpsc::unbounded_channel();
        let origin = Peer::new(ClientId(1), "172.16.0.1:7000".parse().unwrap(), tx);
        let reply: Value = serde_json::from_str(&reply_for(&origin, outcome).unwrap()).unwrap();
        assert_eq!(
            reply,
            json!({"status": "error", "message": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn frames_after_a_panic_are_still_handled() {
        let router = Router::new(Arc::new(ToggleGrid::new()), Arc::new(ClientRegistry::new()));
        let (a, _rx_a) = connect(&router, 1).await;
        let (_b, mut rx_b) = connect(&router, 2).await;

        let faulted = contain_faults(async {
            let cells: Vec<u8> = Vec::new();
            let _ = cells[3];
            Ok(FanOut::default())
        })
        .await;
        assert!(reply_for(&a, faulted).is_some());

        let reply = router
            .handle_frame(&a, r#"{"type":"boxclick","index":4,"additionalData":"after"}"#)
            .await;
        assert!(reply.is_none());

        let frame: Value = serde_json::from_str(&rx_b.try_recv().unwrap()).unwrap();
        assert_eq!(frame["additionalData"], json!("after"));
        assert_eq!(frame["newValue"], json!(1));
    }

    #[test]
    fn success_produces_no_reply() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let origin = Peer::new(ClientId(1), "172.16.0.1:7000".parse().unwrap(), tx);
        assert!(reply_for(&origin, Ok(FanOut { delivered: 3, failed: 0 })).is_none());
    }
}
