//! Fan-out of relayed events.
//!
//! Routing policy:
//! - success envelopes go to **every** registered client except the
//!   originator;
//! - error envelopes never pass through here, the router replies to
//!   the sender directly.
//!
//! Delivery means pushing onto the recipient's unbounded queue, so a
//! slow client never holds up the others. A client whose queue is
//! closed is counted and logged, then skipped.

use std::sync::Arc;

use relay_core::{OutboundEvent, RelayError};
use relay_protocol::{encode_envelope, Envelope};
use tracing::warn;

use crate::registry::ClientRegistry;
use crate::types::{ClientId, Peer};

/// Outcome of one publish.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<ClientRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Broadcaster { registry }
    }

    /// Wrap `event` in a success envelope tagged with `origin`'s
    /// provenance and deliver it to every other client.
    ///
    /// Only encoding can fail; per-recipient failures end up in
    /// [`FanOut::failed`].
    pub async fn publish(&self, origin: &Peer, event: OutboundEvent) -> Result<FanOut, RelayError> {
        let envelope = Envelope::event(event, origin.provenance());
        let text = encode_envelope(&envelope)?;
        Ok(self.fan_out(origin.id(), &text).await)
    }

    /// Deliver an already-encoded frame to everyone but `except`.
    pub async fn fan_out(&self, except: ClientId, text: &str) -> FanOut {
        let mut outcome = FanOut::default();

        self.registry
            .for_each_except(except, |peer| match peer.send(text.to_string()) {
                Ok(()) => outcome.delivered += 1,
                Err(_) => {
                    outcome.failed += 1;
                    warn!(client_id = %peer.id(), peer = %peer.addr(), "dropping frame for closed client");
                }
            })
            .await;

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::BoxClick;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;

    use crate::types::OutboundRx;

    fn peer(id: u64) -> (Peer, OutboundRx) {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = format!("10.0.0.{}:5000", id).parse().unwrap();
        (Peer::new(ClientId(id), addr, tx), rx)
    }

    #[tokio::test]
    async fn publish_skips_originator() {
        let registry = Arc::new(ClientRegistry::new());
        let (a, mut rx_a) = peer(1);
        let (b, mut rx_b) = peer(2);
        let (c, mut rx_c) = peer(3);
        registry.add(a.clone()).await;
        registry.add(b).await;
        registry.add(c).await;

        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let event = OutboundEvent::box_click(
            BoxClick {
                index: 5,
                additional_data: json!("foo"),
            },
            1,
        );
        let outcome = broadcaster.publish(&a, event).await.unwrap();

        assert_eq!(outcome, FanOut { delivered: 2, failed: 0 });
        assert!(rx_a.try_recv().is_err());

        for rx in [&mut rx_b, &mut rx_c] {
            let frame: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
            assert_eq!(frame["source"], json!("10.0.0.1:5000"));
            assert_eq!(frame["newValue"], json!(1));
        }
    }

    #[tokio::test]
    async fn closed_recipient_does_not_block_others() {
        let registry = Arc::new(ClientRegistry::new());
        let (a, _rx_a) = peer(1);
        let (b, rx_b) = peer(2);
        let (c, mut rx_c) = peer(3);
        let (d, mut rx_d) = peer(4);
        registry.add(a).await;
        registry.add(b).await;
        registry.add(c).await;
        registry.add(d).await;

        drop(rx_b); // b's writer is gone

        let broadcaster = Broadcaster::new(registry);
        let outcome = broadcaster.fan_out(ClientId(1), "hello").await;

        assert_eq!(outcome, FanOut { delivered: 2, failed: 1 });
        assert_eq!(rx_c.try_recv().unwrap(), "hello");
        assert_eq!(rx_d.try_recv().unwrap(), "hello");
    }

    #[tokio::test]
    async fn publish_with_no_other_clients() {
        let registry = Arc::new(ClientRegistry::new());
        let (a, _rx_a) = peer(1);
        registry.add(a.clone()).await;

        let outcome = Broadcaster::new(registry).fan_out(a.id(), "x").await;
        assert_eq!(outcome, FanOut::default());
    }
}
