//! Maps the upstream payload shapes onto the portal's fixed message and
//! chat-summary models.

use crate::models::{ChatKind, ChatSummary, Message};

use super::types::{RawChatPayload, RawMessagePayload};

/// Raw numeric timestamps below this are assumed to be seconds-scale.
const MILLIS_EPOCH_THRESHOLD: i64 = 1_000_000_000_000;

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// First candidate that is present and non-empty after trimming.
fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Scale a raw timestamp to epoch milliseconds.
pub fn scale_timestamp(raw: i64) -> i64 {
    if raw < MILLIS_EPOCH_THRESHOLD {
        raw * 1000
    } else {
        raw
    }
}

pub fn message_body(raw: &RawMessagePayload) -> String {
    first_non_empty([
        raw.body.as_deref(),
        raw.text.as_deref(),
        raw.content.as_deref(),
        raw.message_content.as_deref(),
        raw.message.as_ref().and_then(|m| m.conversation.as_deref()),
        raw.message
            .as_ref()
            .and_then(|m| m.extended_text.as_ref())
            .and_then(|e| e.text.as_deref()),
    ])
    .unwrap_or("")
    .to_string()
}

fn message_chat_id(raw: &RawMessagePayload) -> String {
    first_non_empty([
        raw.remote_jid.as_deref(),
        raw.chat_id.as_deref(),
        raw.key.as_ref().and_then(|k| k.remote_jid.as_deref()),
    ])
    .unwrap_or("")
    .to_string()
}

/// Explicit id, else a best-effort synthesized one. Two id-less messages
/// landing in the same chat at the same timestamp would collide; the
/// upstream never promises better.
fn message_id(raw: &RawMessagePayload) -> String {
    if let Some(id) = first_non_empty([
        raw.id.as_deref(),
        raw.key.as_ref().and_then(|k| k.id.as_deref()),
    ]) {
        return id.to_string();
    }

    let peer = first_non_empty([raw.remote_jid.as_deref(), raw.chat_id.as_deref()]).unwrap_or("unknown");
    let stamp = raw.timestamp.unwrap_or_else(now_millis);
    format!("{}-{}", peer, stamp)
}

pub fn normalize_message(raw: &RawMessagePayload, kind: ChatKind) -> Message {
    let raw_timestamp = raw
        .timestamp
        .or(raw.message_timestamp)
        .or(raw.send_at)
        .unwrap_or_else(now_millis);

    Message {
        id: message_id(raw),
        kind,
        chat_id: message_chat_id(raw),
        body: message_body(raw),
        from_me: raw.from_me.unwrap_or(false) || raw.author.as_deref() == Some("me"),
        sender_name: first_non_empty([
            raw.sender_name.as_deref(),
            raw.push_name.as_deref(),
            raw.author.as_deref(),
            raw.participant.as_deref(),
        ])
        .map(str::to_string),
        timestamp: Some(scale_timestamp(raw_timestamp)),
        edited: false,
        reply_to_id: None,
    }
}

/// Human-facing name for a raw conversation id: the part before any `@`.
pub fn display_id(id: &str) -> &str {
    id.split('@').next().unwrap_or(id)
}

pub fn normalize_chat(raw: &RawChatPayload) -> ChatSummary {
    let id = first_non_empty([
        raw.id.as_deref(),
        raw.chat_id.as_deref(),
        raw.remote_jid.as_deref(),
        raw.last_message
            .as_ref()
            .and_then(|m| m.remote_jid.as_deref()),
    ])
    .unwrap_or("")
    .to_string();

    let name = first_non_empty([
        raw.name.as_deref(),
        raw.formatted_name.as_deref(),
        raw.push_name.as_deref(),
        raw.short_name.as_deref(),
        Some(display_id(&id)),
    ])
    .unwrap_or("Unknown contact")
    .to_string();

    let last_message = raw
        .last_message
        .as_ref()
        .or_else(|| raw.messages.as_ref().and_then(|m| m.last()))
        .map(|m| normalize_message(m, ChatKind::Direct));

    ChatSummary {
        kind: ChatKind::Direct,
        id,
        name,
        unread_count: raw.unread_count.or(raw.unread).or(raw.not_read).unwrap_or(0),
        avatar_url: first_non_empty([
            raw.picture_url.as_deref(),
            raw.profile_picture_url.as_deref(),
            raw.profile_pic_url.as_deref(),
            raw.image_url.as_deref(),
            raw.photo.as_deref(),
        ])
        .map(str::to_string),
        last_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::types::{RawExtendedText, RawMessageContent, RawMessageKey};

    // ==================== message normalization ====================

    #[test]
    fn test_body_prefers_flat_fields_in_order() {
        let raw = RawMessagePayload {
            body: Some("from body".to_string()),
            text: Some("from text".to_string()),
            ..Default::default()
        };
        assert_eq!(message_body(&raw), "from body");

        let raw = RawMessagePayload {
            text: Some("from text".to_string()),
            content: Some("from content".to_string()),
            ..Default::default()
        };
        assert_eq!(message_body(&raw), "from text");
    }

    #[test]
    fn test_body_falls_back_to_nested_conversation() {
        let raw = RawMessagePayload {
            message: Some(RawMessageContent {
                conversation: Some("nested hello".to_string()),
                extended_text: None,
            }),
            ..Default::default()
        };
        assert_eq!(message_body(&raw), "nested hello");
    }

    #[test]
    fn test_body_falls_back_to_extended_text() {
        let raw = RawMessagePayload {
            message: Some(RawMessageContent {
                conversation: None,
                extended_text: Some(RawExtendedText {
                    text: Some("extended hello".to_string()),
                }),
            }),
            ..Default::default()
        };
        assert_eq!(message_body(&raw), "extended hello");
    }

    #[test]
    fn test_body_empty_when_nothing_present() {
        assert_eq!(message_body(&RawMessagePayload::default()), "");
    }

    #[test]
    fn test_empty_strings_are_skipped() {
        let raw = RawMessagePayload {
            body: Some(String::new()),
            text: Some("real".to_string()),
            ..Default::default()
        };
        assert_eq!(message_body(&raw), "real");
    }

    #[test]
    fn test_seconds_scale_timestamps_are_promoted() {
        assert_eq!(scale_timestamp(1_700_000_000), 1_700_000_000_000);
        assert_eq!(scale_timestamp(999_999_999_999), 999_999_999_999_000);
    }

    #[test]
    fn test_millis_scale_timestamps_are_unchanged() {
        assert_eq!(scale_timestamp(1_000_000_000_000), 1_000_000_000_000);
        assert_eq!(scale_timestamp(1_700_000_000_000), 1_700_000_000_000);
    }

    #[test]
    fn test_timestamp_candidate_order() {
        let raw = RawMessagePayload {
            message_timestamp: Some(1_700_000_001),
            send_at: Some(1_700_000_002),
            ..Default::default()
        };
        let msg = normalize_message(&raw, ChatKind::Direct);
        assert_eq!(msg.timestamp, Some(1_700_000_001_000));
    }

    #[test]
    fn test_message_id_from_key() {
        let raw = RawMessagePayload {
            key: Some(RawMessageKey {
                id: Some("key-id".to_string()),
                remote_jid: None,
            }),
            ..Default::default()
        };
        let msg = normalize_message(&raw, ChatKind::Direct);
        assert_eq!(msg.id, "key-id");
    }

    #[test]
    fn test_message_id_synthesized_from_peer_and_timestamp() {
        let raw = RawMessagePayload {
            remote_jid: Some("5511999999999@s.whatsapp.net".to_string()),
            timestamp: Some(1_700_000_000),
            ..Default::default()
        };
        let msg = normalize_message(&raw, ChatKind::Direct);
        assert_eq!(msg.id, "5511999999999@s.whatsapp.net-1700000000");
    }

    #[test]
    fn test_from_me_via_author() {
        let raw = RawMessagePayload {
            author: Some("me".to_string()),
            ..Default::default()
        };
        assert!(normalize_message(&raw, ChatKind::Direct).from_me);
    }

    #[test]
    fn test_sender_name_precedence() {
        let raw = RawMessagePayload {
            push_name: Some("Push".to_string()),
            participant: Some("Participant".to_string()),
            ..Default::default()
        };
        let msg = normalize_message(&raw, ChatKind::Direct);
        assert_eq!(msg.sender_name.as_deref(), Some("Push"));
    }

    // ==================== chat normalization ====================

    #[test]
    fn test_chat_id_from_last_message() {
        let raw = RawChatPayload {
            last_message: Some(RawMessagePayload {
                remote_jid: Some("peer@s.whatsapp.net".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(normalize_chat(&raw).id, "peer@s.whatsapp.net");
    }

    #[test]
    fn test_chat_name_falls_back_to_stripped_id() {
        let raw = RawChatPayload {
            remote_jid: Some("5511988887777@s.whatsapp.net".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize_chat(&raw).name, "5511988887777");
    }

    #[test]
    fn test_chat_name_placeholder_when_everything_is_empty() {
        assert_eq!(normalize_chat(&RawChatPayload::default()).name, "Unknown contact");
    }

    #[test]
    fn test_unread_count_candidate_chain() {
        let raw = RawChatPayload {
            not_read: Some(7),
            ..Default::default()
        };
        assert_eq!(normalize_chat(&raw).unread_count, 7);
        assert_eq!(normalize_chat(&RawChatPayload::default()).unread_count, 0);
    }

    #[test]
    fn test_last_message_falls_back_to_embedded_list_tail() {
        let raw = RawChatPayload {
            id: Some("peer".to_string()),
            messages: Some(vec![
                RawMessagePayload {
                    id: Some("first".to_string()),
                    ..Default::default()
                },
                RawMessagePayload {
                    id: Some("tail".to_string()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        let chat = normalize_chat(&raw);
        assert_eq!(chat.last_message.unwrap().id, "tail");
    }
}
