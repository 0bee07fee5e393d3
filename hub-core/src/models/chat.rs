use serde::{Deserialize, Serialize};

use super::message::{ChatKind, Message};

/// Derived contact-list entry.
///
/// Never stored as its own row: materialized from the latest message per
/// `(kind, id)` and enriched with upstream chat metadata where available.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatSummary {
    pub kind: ChatKind,
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub unread_count: i64,
    pub last_message: Option<Message>,
}
