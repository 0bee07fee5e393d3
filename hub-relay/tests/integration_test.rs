//! Integration tests for the hub relay
//!
//! These tests spin up a real relay and connect clients to verify the
//! subscribe handshake and insert fan-out work correctly.

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Start a test relay on a random available port
async fn start_test_relay() -> (u16, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let state = std::sync::Arc::new(hub_relay::RelayState::new());

    let handle = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let ws_stream = tokio_tungstenite::accept_async(stream).await.unwrap();
            let state = state.clone();
            tokio::spawn(async move {
                hub_relay::handle_connection(ws_stream, state).await;
            });
        }
    });

    // Give the relay time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (port, handle)
}

/// Connect a client and subscribe to the given channels
async fn connect_subscriber(
    port: u16,
    channels: &[&str],
) -> tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
> {
    let url = format!("ws://127.0.0.1:{}", port);
    let (ws_stream, _) = connect_async(&url).await.expect("Failed to connect");

    let (mut write, mut read) = ws_stream.split();

    let subscribe = json!({
        "type": "subscribe",
        "channels": channels,
    });
    write
        .send(Message::Text(subscribe.to_string().into()))
        .await
        .unwrap();

    // Wait for the ack
    let response = timeout(Duration::from_secs(5), read.next())
        .await
        .expect("Timeout waiting for ack")
        .expect("Stream closed")
        .expect("Read error");

    if let Message::Text(text) = response {
        let msg: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(msg["type"], "ack");
    } else {
        panic!("Expected text message");
    }

    write.reunite(read).unwrap()
}

#[tokio::test]
async fn test_client_subscribes_and_gets_ack() {
    let (port, relay_handle) = start_test_relay().await;

    let _client = connect_subscriber(port, &["chat_messages"]).await;

    relay_handle.abort();
}

#[tokio::test]
async fn test_insert_reaches_other_subscriber() {
    let (port, relay_handle) = start_test_relay().await;

    let publisher = connect_subscriber(port, &["chat_messages"]).await;
    let listener = connect_subscriber(port, &["chat_messages"]).await;

    let (mut pub_write, _pub_read) = publisher.split();
    let (_lis_write, mut lis_read) = listener.split();

    let insert = json!({
        "type": "insert",
        "channel": "chat_messages",
        "row": {
            "id": "m1",
            "kind": "direct",
            "chat_id": "5511999999999@s.whatsapp.net",
            "body": "*#Alice:*\nhello",
            "from_me": true,
        },
    });
    pub_write
        .send(Message::Text(insert.to_string().into()))
        .await
        .unwrap();

    let msg = timeout(Duration::from_secs(5), lis_read.next())
        .await
        .expect("Timeout waiting for insert")
        .expect("Stream closed")
        .expect("Read error");

    if let Message::Text(text) = msg {
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["type"], "insert");
        assert_eq!(parsed["channel"], "chat_messages");
        assert_eq!(parsed["row"]["id"], "m1");
    } else {
        panic!("Expected text message");
    }

    relay_handle.abort();
}

#[tokio::test]
async fn test_insert_not_echoed_to_publisher() {
    let (port, relay_handle) = start_test_relay().await;

    let publisher = connect_subscriber(port, &["group_messages"]).await;
    let (mut pub_write, mut pub_read) = publisher.split();

    let insert = json!({
        "type": "insert",
        "channel": "group_messages",
        "row": { "id": "g1" },
    });
    pub_write
        .send(Message::Text(insert.to_string().into()))
        .await
        .unwrap();

    // The publisher already has the row locally and must not hear it back
    let echoed = timeout(Duration::from_millis(300), pub_read.next()).await;
    assert!(echoed.is_err(), "publisher should not receive its own insert");

    relay_handle.abort();
}

#[tokio::test]
async fn test_insert_respects_channel_boundaries() {
    let (port, relay_handle) = start_test_relay().await;

    let publisher = connect_subscriber(port, &["chat_messages"]).await;
    let group_only = connect_subscriber(port, &["group_messages"]).await;

    let (mut pub_write, _pub_read) = publisher.split();
    let (_go_write, mut go_read) = group_only.split();

    let insert = json!({
        "type": "insert",
        "channel": "chat_messages",
        "row": { "id": "m2" },
    });
    pub_write
        .send(Message::Text(insert.to_string().into()))
        .await
        .unwrap();

    let msg = timeout(Duration::from_millis(300), go_read.next()).await;
    assert!(msg.is_err(), "group subscriber should not see direct inserts");

    relay_handle.abort();
}

#[tokio::test]
async fn test_subscriber_on_both_channels_gets_both() {
    let (port, relay_handle) = start_test_relay().await;

    let publisher = connect_subscriber(port, &["chat_messages", "group_messages"]).await;
    let listener = connect_subscriber(port, &["chat_messages", "group_messages"]).await;

    let (mut pub_write, _pub_read) = publisher.split();
    let (_lis_write, mut lis_read) = listener.split();

    for channel in ["chat_messages", "group_messages"] {
        let insert = json!({
            "type": "insert",
            "channel": channel,
            "row": { "id": format!("on-{}", channel) },
        });
        pub_write
            .send(Message::Text(insert.to_string().into()))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for _ in 0..2 {
        let msg = timeout(Duration::from_secs(5), lis_read.next())
            .await
            .expect("Timeout waiting for insert")
            .expect("Stream closed")
            .expect("Read error");
        if let Message::Text(text) = msg {
            let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
            seen.push(parsed["channel"].as_str().unwrap().to_string());
        }
    }
    seen.sort();
    assert_eq!(seen, ["chat_messages", "group_messages"]);

    relay_handle.abort();
}

#[tokio::test]
async fn test_disconnected_subscriber_is_skipped() {
    let (port, relay_handle) = start_test_relay().await;

    let publisher = connect_subscriber(port, &["chat_messages"]).await;
    let listener = connect_subscriber(port, &["chat_messages"]).await;
    let survivor = connect_subscriber(port, &["chat_messages"]).await;

    drop(listener);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (mut pub_write, _pub_read) = publisher.split();
    let (_sv_write, mut sv_read) = survivor.split();

    let insert = json!({
        "type": "insert",
        "channel": "chat_messages",
        "row": { "id": "m3" },
    });
    pub_write
        .send(Message::Text(insert.to_string().into()))
        .await
        .unwrap();

    let msg = timeout(Duration::from_secs(5), sv_read.next())
        .await
        .expect("Timeout waiting for insert")
        .expect("Stream closed")
        .expect("Read error");

    if let Message::Text(text) = msg {
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["row"]["id"], "m3");
    } else {
        panic!("Expected text message");
    }

    relay_handle.abort();
}
