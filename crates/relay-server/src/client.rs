// crates/relay-server/src/client.rs

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info};

use crate::router::Router;
use crate::types::{ClientId, OutboundRx, OutboundTx, Peer};

/// How long a closed client's writer may keep flushing before it is aborted.
const WRITER_GRACE: Duration = Duration::from_secs(5);

/// Run the client I/O loop for a single upgraded connection.
///
/// Frames from this client are handled strictly one after another;
/// the reader only pulls the next frame once the previous one has been
/// validated, applied and fanned out. Returns when the client closes,
/// the transport errors, or the writer can no longer deliver.
pub async fn run_client(
    client_id: ClientId,
    peer_addr: SocketAddr,
    ws: WebSocketStream<TcpStream>,
    router: Router,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();
    let peer = Peer::new(client_id, peer_addr, out_tx);

    // Writer task: drain the outbound queue onto the socket.
    let writer_handle = tokio::spawn(async move {
        let mut out_rx = out_rx;

        while let Some(text) = out_rx.recv().await {
            if let Err(e) = ws_tx.send(Message::text(text)).await {
                debug!(client_id = %client_id, error = %e, "write failed");
                break;
            }
        }

        let _ = ws_tx.close().await;
    });

    let clients = router.open(peer.clone()).await;
    info!(client_id = %client_id, peer = %peer_addr, clients, "client connected");

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(reply) = router.handle_frame(&peer, text.as_str()).await {
                    if peer.send(reply).is_err() {
                        // Writer is gone, nobody left to talk to.
                        break;
                    }
                }
            }
            Ok(Message::Binary(data)) => {
                debug!(client_id = %client_id, len = data.len(), "ignoring binary frame");
            }
            Ok(Message::Close(_)) => break,
            // Ping/pong are answered by tungstenite itself.
            Ok(_) => {}
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "read error");
                break;
            }
        }
    }

    let remaining = router.close(client_id).await;
    info!(
        client_id = %client_id,
        peer = %peer_addr,
        remaining,
        cells_set = router.grid().count_set(),
        "client disconnected"
    );

    // Last sender goes away with `peer`; the writer flushes what is queued and exits.
    drop(peer);
    if !finish_writer(writer_handle, WRITER_GRACE).await {
        debug!(client_id = %client_id, "writer did not drain in time, aborted");
    }
}

/// Wait up to `grace` for the writer to finish, then abort it.
///
/// Returns `true` if the writer ended on its own. A peer that stopped
/// reading can leave the writer parked in `send` forever.
async fn finish_writer(mut handle: JoinHandle<()>, grace: Duration) -> bool {
    if timeout(grace, &mut handle).await.is_ok() {
        return true;
    }

    handle.abort();
    let _ = handle.await;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn finished_writer_is_awaited() {
        let handle = tokio::spawn(async {});
        assert!(finish_writer(handle, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn stuck_writer_is_aborted_after_grace() {
        let held = Arc::new(());
        let in_task = Arc::clone(&held);
        let handle = tokio::spawn(async move {
            let _socket = in_task;
            std::future::pending::<()>().await;
        });

        assert!(!finish_writer(handle, Duration::from_millis(50)).await);
        // The aborted task dropped everything it owned.
        assert_eq!(Arc::strong_count(&held), 1);
    }
}
