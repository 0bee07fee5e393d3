//! Raw Evolution API payload shapes.
//!
//! The upstream API is inconsistent about field names, so every field it has
//! been seen to use is optional here and normalization picks the first
//! non-empty candidate per logical value.

use serde::Deserialize;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawMessageKey {
    pub id: Option<String>,
    #[serde(rename = "remoteJid")]
    pub remote_jid: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawExtendedText {
    pub text: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawMessageContent {
    pub conversation: Option<String>,
    #[serde(rename = "extendedTextMessage")]
    pub extended_text: Option<RawExtendedText>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawMessagePayload {
    pub id: Option<String>,
    pub key: Option<RawMessageKey>,
    pub message: Option<RawMessageContent>,
    pub body: Option<String>,
    pub text: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "messageContent")]
    pub message_content: Option<String>,
    #[serde(rename = "fromMe")]
    pub from_me: Option<bool>,
    pub author: Option<String>,
    #[serde(rename = "senderName")]
    pub sender_name: Option<String>,
    #[serde(rename = "pushName")]
    pub push_name: Option<String>,
    pub participant: Option<String>,
    #[serde(rename = "remoteJid")]
    pub remote_jid: Option<String>,
    #[serde(rename = "chatId")]
    pub chat_id: Option<String>,
    pub timestamp: Option<i64>,
    #[serde(rename = "messageTimestamp")]
    pub message_timestamp: Option<i64>,
    #[serde(rename = "sendAt")]
    pub send_at: Option<i64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawChatPayload {
    pub id: Option<String>,
    #[serde(rename = "chatId")]
    pub chat_id: Option<String>,
    #[serde(rename = "remoteJid")]
    pub remote_jid: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "formattedName")]
    pub formatted_name: Option<String>,
    #[serde(rename = "pushName")]
    pub push_name: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    #[serde(rename = "unreadCount")]
    pub unread_count: Option<i64>,
    pub unread: Option<i64>,
    #[serde(rename = "notRead")]
    pub not_read: Option<i64>,
    #[serde(rename = "pictureUrl")]
    pub picture_url: Option<String>,
    #[serde(rename = "profilePictureUrl")]
    pub profile_picture_url: Option<String>,
    #[serde(rename = "profilePicUrl")]
    pub profile_pic_url: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub photo: Option<String>,
    #[serde(rename = "lastMessage")]
    pub last_message: Option<RawMessagePayload>,
    pub messages: Option<Vec<RawMessagePayload>>,
}

/// List responses wrap their items under any of several keys.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Option<Vec<T>>,
    pub chats: Option<Vec<T>>,
    pub messages: Option<Vec<T>>,
    pub items: Option<Vec<T>>,
    pub results: Option<Vec<T>>,
}

impl<T> ListEnvelope<T> {
    /// Items of a `/chats` response: the `chats` key wins over the generic
    /// wrappers.
    pub fn into_chats(self) -> Vec<T> {
        self.chats
            .or(self.data)
            .or(self.items)
            .or(self.results)
            .unwrap_or_default()
    }

    /// Items of a `/messages` response: the `messages` key wins over the
    /// generic wrappers.
    pub fn into_messages(self) -> Vec<T> {
        self.messages
            .or(self.data)
            .or(self.items)
            .or(self.results)
            .unwrap_or_default()
    }
}
