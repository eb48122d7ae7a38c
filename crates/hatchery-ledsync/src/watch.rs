use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

use crate::snapshot::{LedSnapshot, parse_frame};

/// The watched document, fixed by the controlling app.
pub const COLLECTION: &str = "led_control";
pub const DOCUMENT: &str = "status";

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// WebSocket URL of the document store's listen endpoint.
    pub url: String,
    /// Seconds to wait before reconnecting after a drop.
    pub reconnect_interval: u64,
}

fn subscribe_frame() -> String {
    json!({
        "action": "subscribe",
        "collection": COLLECTION,
        "document": DOCUMENT,
    })
    .to_string()
}

/// Maintain the subscription and forward each decoded snapshot into the
/// channel. The dispatch loop on the other end applies them one at a
/// time. Returns only when the receiver is gone.
pub async fn run(config: WatchConfig, tx: mpsc::Sender<LedSnapshot>) {
    loop {
        info!("Connecting to {}", config.url);

        match connect_async(config.url.as_str()).await {
            Ok((mut ws, _)) => {
                match ws.send(Message::Text(subscribe_frame())).await {
                    Ok(()) => info!("Subscribed to {}/{}", COLLECTION, DOCUMENT),
                    Err(e) => warn!("Failed to send subscribe frame: {}", e),
                }

                while let Some(msg) = ws.next().await {
                    match msg {
                        Ok(Message::Text(text)) => match parse_frame(&text) {
                            Ok(Some(snapshot)) => {
                                if tx.send(snapshot).await.is_err() {
                                    info!("Snapshot channel closed");
                                    return;
                                }
                            }
                            Ok(None) => info!("No LED document found."),
                            Err(e) => warn!("Malformed status frame: {}", e),
                        },
                        Ok(Message::Close(_)) => {
                            info!("Server closed the subscription");
                            break;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!("WebSocket error: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => warn!("Failed to connect to {}: {}", config.url, e),
        }

        tokio::time::sleep(Duration::from_secs(config.reconnect_interval)).await;
    }
}
