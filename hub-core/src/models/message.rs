use serde::{Deserialize, Serialize};

/// Which backing table a message belongs to.
///
/// A direct chat and a group can coincidentally share an id, so every
/// conversation is keyed by the pair `(ChatKind, id)` rather than the id
/// alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Direct,
    Group,
}

impl ChatKind {
    /// Backing table / realtime channel name for this source kind.
    pub fn channel(&self) -> &'static str {
        match self {
            ChatKind::Direct => "chat_messages",
            ChatKind::Group => "group_messages",
        }
    }

    pub fn from_channel(channel: &str) -> Option<Self> {
        match channel {
            "chat_messages" => Some(ChatKind::Direct),
            "group_messages" => Some(ChatKind::Group),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub id: String,
    pub kind: ChatKind,
    pub chat_id: String,
    pub body: String,
    pub from_me: bool,
    pub sender_name: Option<String>,
    /// Epoch milliseconds. None when the source row carries no timestamp.
    pub timestamp: Option<i64>,
    pub edited: bool,
    pub reply_to_id: Option<String>,
}

impl Message {
    pub fn key(&self) -> (ChatKind, &str) {
        (self.kind, self.chat_id.as_str())
    }
}
