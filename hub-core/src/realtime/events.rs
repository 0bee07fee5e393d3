use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relay wire protocol (shared between the portal and hub-relay)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RelayEvent {
    #[serde(rename = "subscribe")]
    Subscribe { channels: Vec<String> },
    #[serde(rename = "ack")]
    Ack { message: String },
    #[serde(rename = "insert")]
    Insert { channel: String, row: Value },
    #[serde(rename = "error")]
    Error { message: String },
}
