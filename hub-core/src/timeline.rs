//! Derived views over the flat message collection: latest message per
//! conversation and the per-conversation timeline.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::models::{ChatKind, ChatSummary, Message};

/// Latest message per `(kind, id)`, in a single pass.
///
/// An empty slot accepts the first message seen regardless of timestamp;
/// after that a message only replaces the slot when its timestamp (missing
/// treated as zero) strictly exceeds the stored one's.
pub fn latest_by_conversation(messages: &[Message]) -> HashMap<(ChatKind, String), Message> {
    let mut latest: HashMap<(ChatKind, String), Message> = HashMap::new();

    for message in messages {
        let (kind, id) = message.key();
        match latest.entry((kind, id.to_string())) {
            Entry::Vacant(slot) => {
                slot.insert(message.clone());
            }
            Entry::Occupied(mut slot) => {
                if message.timestamp.unwrap_or(0) > slot.get().timestamp.unwrap_or(0) {
                    slot.insert(message.clone());
                }
            }
        }
    }

    latest
}

/// Contact-list ordering: most recently active first, entries without a
/// timestamp last. Stable, so equal timestamps keep their input order.
pub fn sort_contacts(entries: &mut [ChatSummary]) {
    entries.sort_by(|a, b| {
        let a_ts = a.last_message.as_ref().and_then(|m| m.timestamp);
        let b_ts = b.last_message.as_ref().and_then(|m| m.timestamp);
        match (a_ts, b_ts) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// The selected conversation's messages, ascending by timestamp. Stable, so
/// exact ties keep input order.
pub fn conversation_timeline(messages: &[Message], kind: ChatKind, chat_id: &str) -> Vec<Message> {
    let mut timeline: Vec<Message> = messages
        .iter()
        .filter(|m| m.key() == (kind, chat_id))
        .cloned()
        .collect();
    timeline.sort_by_key(|m| m.timestamp.unwrap_or(0));
    timeline
}
