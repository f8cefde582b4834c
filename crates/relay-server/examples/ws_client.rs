//! Example: interactive relay client.
//!
//! Usage:
//!
//! ```bash
//! # Run server
//! cargo run -p relay-server
//!
//! # In two other terminals
//! cargo run -p relay-server --example ws_client
//! ```
//!
//! Every stdin line is sent as one text frame; every frame received
//! is printed with a `<<` prefix. Shortcuts:
//! - `click N`   sends a boxclick for cell N
//! - `move X Y`  sends a mousemove to (X, Y)
//! - `quit`      leaves

use clap::Parser;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser)]
#[clap(name = "ws-client")]
#[clap(about = "Send frames to the relay and print what comes back")]
struct Cli {
    /// Relay URL
    #[clap(short, long, default_value = "ws://127.0.0.1:8765")]
    url: String,

    /// Sent as additionalData on shortcut commands
    #[clap(short, long, default_value = "ws-client")]
    tag: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    println!("Connecting to {}...", cli.url);
    let (ws, _) = connect_async(cli.url.as_str()).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();
    println!("Connected. Type raw JSON, `click N`, `move X Y`, or `quit`.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("\nEOF on stdin, exiting client.");
                    break;
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
                    println!("Exiting client.");
                    break;
                }

                let frame = expand_shortcut(trimmed, &cli.tag).unwrap_or_else(|| trimmed.to_string());
                ws_tx.send(Message::text(frame)).await?;
            }

            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => println!("<< {}", text.as_str()),
                    Some(Ok(Message::Close(_))) | None => {
                        println!("Server closed the connection.");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        eprintln!("Read error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    let _ = ws_tx.close().await;
    Ok(())
}

fn expand_shortcut(line: &str, tag: &str) -> Option<String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let frame = match parts.as_slice() {
        ["click", index] => json!({
            "type": "boxclick",
            "index": index.parse::<i64>().ok()?,
            "additionalData": tag,
        }),
        ["move", x, y] => json!({
            "type": "mousemove",
            "x": x.parse::<f64>().ok()?,
            "y": y.parse::<f64>().ok()?,
            "additionalData": tag,
        }),
        _ => return None,
    };
    Some(frame.to_string())
}
