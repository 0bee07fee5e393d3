use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relay wire protocol (shared between the relay and the portal client)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_serialization() {
        let event = RelayEvent::Subscribe {
            channels: vec!["chat_messages".to_string()],
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"subscribe\""));
        assert!(json.contains("\"channels\":[\"chat_messages\"]"));

        let parsed: RelayEvent = serde_json::from_str(&json).unwrap();
        if let RelayEvent::Subscribe { channels } = parsed {
            assert_eq!(channels, ["chat_messages"]);
        } else {
            panic!("Expected Subscribe event");
        }
    }

    #[test]
    fn test_insert_serialization() {
        let event = RelayEvent::Insert {
            channel: "group_messages".to_string(),
            row: serde_json::json!({ "id": "m1" }),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"insert\""));
        assert!(json.contains("\"channel\":\"group_messages\""));

        let parsed: RelayEvent = serde_json::from_str(&json).unwrap();
        if let RelayEvent::Insert { channel, row } = parsed {
            assert_eq!(channel, "group_messages");
            assert_eq!(row["id"], "m1");
        } else {
            panic!("Expected Insert event");
        }
    }

    #[test]
    fn test_error_serialization() {
        let event = RelayEvent::Error {
            message: "No channels requested".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("No channels requested"));
    }

    #[test]
    fn test_deserialize_from_client_format() {
        let json = r#"{"type":"subscribe","channels":["chat_messages","group_messages"]}"#;
        let event: RelayEvent = serde_json::from_str(json).unwrap();
        if let RelayEvent::Subscribe { channels } = event {
            assert_eq!(channels.len(), 2);
        } else {
            panic!("Expected Subscribe");
        }
    }
}
