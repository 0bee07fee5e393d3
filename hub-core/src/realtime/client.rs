use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, Mutex as TokioMutex};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsFrame};
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_RELAY_URL;
use crate::models::{ChatKind, Message};

use super::events::RelayEvent;

/// Internal message type for the write channel
enum WriteMessage {
    Data(String),
    Close,
}

/// WebSocket client that subscribes to row-insert events on the hub relay.
///
/// Each message source kind is a separate channel; received inserts are
/// forwarded into the channel the store drains. The connection is retried
/// every 3 seconds until shut down.
pub struct RealtimeClient {
    relay_url: Arc<TokioMutex<String>>,
    /// std::sync::Mutex so publish() can be called from sync code paths
    write_tx: Arc<StdMutex<Option<mpsc::UnboundedSender<WriteMessage>>>>,
    connected: Arc<TokioMutex<bool>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Default for RealtimeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeClient {
    pub fn new() -> Self {
        let relay_url =
            std::env::var("HUB_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());

        info!(url = %relay_url, "Using relay URL");

        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            relay_url: Arc::new(TokioMutex::new(relay_url)),
            write_tx: Arc::new(StdMutex::new(None)),
            connected: Arc::new(TokioMutex::new(false)),
            shutdown_tx,
        }
    }

    pub async fn relay_url(&self) -> String {
        self.relay_url.lock().await.clone()
    }

    pub async fn set_relay_url(&self, url: impl Into<String>) {
        *self.relay_url.lock().await = url.into();
    }

    pub async fn is_connected(&self) -> bool {
        *self.connected.lock().await
    }

    /// Connect to the relay and keep the subscription alive.
    pub async fn connect(
        &self,
        channels: Vec<String>,
        inserts: mpsc::UnboundedSender<Message>,
    ) -> Result<(), String> {
        let relay_url = self.relay_url.lock().await.clone();
        let write_tx = self.write_tx.clone();
        let connected = self.connected.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            loop {
                // Check for shutdown before attempting connection
                if shutdown_rx.try_recv().is_ok() {
                    info!("Shutdown signal received, stopping reconnection");
                    break;
                }

                info!(url = %relay_url, "Connecting to hub relay");

                match connect_async(&relay_url).await {
                    Ok((ws_stream, _)) => {
                        info!("Connected to hub relay");
                        *connected.lock().await = true;

                        let (mut ws_write, mut ws_read) = ws_stream.split();

                        // Subscribe to the message channels
                        let subscribe = RelayEvent::Subscribe {
                            channels: channels.clone(),
                        };
                        let subscribe_json = match serde_json::to_string(&subscribe) {
                            Ok(json) => json,
                            Err(e) => {
                                error!(error = %e, "Failed to serialize subscription");
                                break;
                            }
                        };

                        if ws_write.send(WsFrame::Text(subscribe_json.into())).await.is_err() {
                            error!("Failed to send subscription");
                            *connected.lock().await = false;
                            tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
                            continue;
                        }

                        // Wait for the subscription ack
                        if let Some(Ok(WsFrame::Text(response))) = ws_read.next().await {
                            match serde_json::from_str::<RelayEvent>(&response) {
                                Ok(RelayEvent::Ack { message }) => {
                                    info!("Subscribed: {}", message);
                                }
                                Ok(RelayEvent::Error { message }) => {
                                    error!("Subscription rejected: {}", message);
                                    *connected.lock().await = false;
                                    tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
                                    continue;
                                }
                                _ => {
                                    warn!("Unexpected response during subscription");
                                }
                            }
                        }

                        // Create channel for outgoing publishes
                        let (tx, mut rx) = mpsc::unbounded_channel::<WriteMessage>();
                        {
                            let mut guard = write_tx.lock().unwrap();
                            *guard = Some(tx);
                        }

                        // Event loop
                        let mut should_reconnect = true;
                        loop {
                            tokio::select! {
                                _ = shutdown_rx.recv() => {
                                    info!("Shutdown signal received, closing connection gracefully");
                                    if let Err(e) = ws_write.send(WsFrame::Close(None)).await {
                                        warn!(error = %e, "Failed to send close frame");
                                    }
                                    should_reconnect = false;
                                    break;
                                }
                                Some(msg) = rx.recv() => {
                                    match msg {
                                        WriteMessage::Data(data) => {
                                            if ws_write.send(WsFrame::Text(data.into())).await.is_err() {
                                                error!("Failed to publish to relay");
                                                break;
                                            }
                                        }
                                        WriteMessage::Close => {
                                            info!("Close requested, sending close frame");
                                            if let Err(e) = ws_write.send(WsFrame::Close(None)).await {
                                                warn!(error = %e, "Failed to send close frame");
                                            }
                                            should_reconnect = false;
                                            break;
                                        }
                                    }
                                }
                                msg = ws_read.next() => {
                                    match msg {
                                        Some(Ok(WsFrame::Text(text))) => {
                                            handle_event(&text, &inserts);
                                        }
                                        Some(Ok(WsFrame::Close(_))) | None => {
                                            info!("Relay closed connection");
                                            break;
                                        }
                                        Some(Err(e)) => {
                                            error!(error = %e, "WebSocket error");
                                            break;
                                        }
                                        _ => {}
                                    }
                                }
                            }
                        }

                        // Cleanup
                        {
                            let mut guard = write_tx.lock().unwrap();
                            *guard = None;
                        }
                        *connected.lock().await = false;
                        info!("Disconnected from hub relay");

                        if !should_reconnect {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, url = %relay_url, "Failed to connect to hub relay");
                    }
                }

                // Reconnect after delay
                debug!("Reconnecting in 3 seconds");
                tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
            }
        });

        Ok(())
    }

    /// Gracefully disconnect from the relay
    pub fn disconnect(&self) {
        info!("Initiating graceful disconnect");
        let _ = self.shutdown_tx.send(());
        if let Ok(guard) = self.write_tx.lock() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(WriteMessage::Close);
            }
        }
    }

    /// Publish a locally persisted message so other portal instances see it.
    pub fn publish(&self, message: &Message) -> Result<(), String> {
        let row = serde_json::to_value(message).map_err(|e| e.to_string())?;
        let event = RelayEvent::Insert {
            channel: message.kind.channel().to_string(),
            row,
        };
        let json = serde_json::to_string(&event).map_err(|e| e.to_string())?;
        // Truncate on char boundaries; bodies can hold multi-byte text
        let preview: String = json.chars().take(100).collect();
        debug!(preview = %preview, "Publishing insert");

        let guard = self.write_tx.lock().map_err(|e| format!("Lock poisoned: {}", e))?;

        if let Some(tx) = guard.as_ref() {
            tx.send(WriteMessage::Data(json))
                .map_err(|e| format!("Failed to publish to relay: {}", e))?;
            Ok(())
        } else {
            // Not connected - the local copy is already stored, so don't block
            warn!("Cannot publish insert: not connected to relay");
            Err("Not connected to relay".to_string())
        }
    }
}

/// Parse one frame from the relay and forward insert rows to the store feed.
fn handle_event(text: &str, inserts: &mpsc::UnboundedSender<Message>) {
    match serde_json::from_str::<RelayEvent>(text) {
        Ok(RelayEvent::Insert { channel, row }) => {
            let Some(kind) = ChatKind::from_channel(&channel) else {
                warn!(channel = %channel, "Insert for unknown channel");
                return;
            };
            match serde_json::from_value::<Message>(row) {
                Ok(mut message) => {
                    // The channel is authoritative for the source kind
                    message.kind = kind;
                    if inserts.send(message).is_err() {
                        warn!("Insert receiver dropped");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse insert row");
                }
            }
        }
        Ok(RelayEvent::Error { message }) => {
            warn!("Relay error: {}", message);
        }
        Ok(_) => {}
        Err(e) => {
            warn!(error = %e, "Failed to parse relay event");
        }
    }
}
