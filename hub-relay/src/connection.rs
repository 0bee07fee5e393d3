use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};
use tracing::{error, info, warn};

use crate::messages::RelayEvent;
use crate::state::RelayState;

/// Handle a single subscriber connection
pub async fn handle_connection(ws_stream: WebSocketStream<TcpStream>, state: Arc<RelayState>) {
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Wait for the subscription request
    let channels = match wait_for_subscribe(&mut ws_receiver).await {
        Some(channels) => channels,
        None => {
            warn!("Connection closed before subscribing");
            return;
        }
    };

    let conn_id = state.register_conn();
    info!(conn_id, channels = ?channels, "Subscriber connected");

    // Channel for frames destined to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    for channel in &channels {
        state.subscribe(conn_id, channel, tx.clone());
    }

    // Acknowledge the subscription
    let ack = RelayEvent::Ack {
        message: format!("Subscribed to {} channels", channels.len()),
    };
    match serde_json::to_string(&ack) {
        Ok(json) => {
            if let Err(e) = ws_sender.send(Message::Text(json.into())).await {
                error!(conn_id, "Failed to send ack: {}", e);
            }
        }
        Err(e) => {
            error!(conn_id, "Failed to serialize ack: {}", e);
        }
    }

    // Forward frames from the channel to the WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Process incoming frames and monitor the send task
    loop {
        tokio::select! {
            res = ws_receiver.next() => {
                match res {
                    Some(Ok(Message::Text(text))) => {
                        handle_message(&text, conn_id, &state);
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!(conn_id, "Subscriber sent close frame");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = data;
                    }
                    Some(Err(e)) => {
                        error!(conn_id, "WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        info!(conn_id, "WebSocket stream ended");
                        break;
                    }
                    _ => {}
                }
            }
            _ = &mut send_task => {
                info!(conn_id, "Send task finished (likely connection lost)");
                break;
            }
        }
    }

    // Cleanup
    send_task.abort();
    state.remove_conn(conn_id);
    info!(conn_id, "Subscriber disconnected");
}

/// Handle one frame from a connected client. Published inserts are
/// re-broadcast to the channel's other subscribers; delivery is best-effort
/// with no queueing for absent subscribers.
pub fn handle_message(text: &str, conn_id: u64, state: &RelayState) {
    match serde_json::from_str::<RelayEvent>(text) {
        Ok(RelayEvent::Insert { channel, .. }) => {
            let delivered = state.broadcast(&channel, text, Some(conn_id));
            info!(conn_id, channel = %channel, delivered, "Relayed insert");
        }
        Ok(RelayEvent::Subscribe { .. }) => {
            warn!(conn_id, "Duplicate subscribe ignored");
        }
        Ok(_) => {}
        Err(e) => {
            warn!(conn_id, "Failed to parse frame: {}", e);
        }
    }
}

/// Wait for the Subscribe message from a new connection
async fn wait_for_subscribe(
    receiver: &mut futures_util::stream::SplitStream<WebSocketStream<TcpStream>>,
) -> Option<Vec<String>> {
    // Give the client 10 seconds to subscribe
    let timeout = tokio::time::timeout(std::time::Duration::from_secs(10), async {
        while let Some(result) = receiver.next().await {
            if let Ok(Message::Text(text)) = result {
                match serde_json::from_str::<RelayEvent>(&text) {
                    Ok(RelayEvent::Subscribe { channels }) => {
                        if channels.is_empty() {
                            warn!("Subscribe with no channels rejected");
                            return None;
                        }
                        return Some(channels);
                    }
                    Ok(_) => {
                        warn!("Expected subscribe as the first frame");
                    }
                    Err(e) => {
                        warn!("Failed to parse subscribe frame: {}", e);
                    }
                }
            }
        }
        None
    });

    match timeout.await {
        Ok(result) => result,
        Err(_) => {
            warn!("Subscription timeout");
            None
        }
    }
}
