use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

/// Characters that cannot appear raw in a URL path segment. Upstream ids
/// are arbitrary strings and may contain any of these.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

use crate::config::EvolutionConfig;
use crate::models::{ChatKind, ChatSummary, Message};

use super::normalize::{normalize_chat, normalize_message};
use super::types::{ListEnvelope, RawChatPayload, RawMessagePayload};

/// Evolution (WhatsApp) API client, scoped to one instance.
pub struct EvolutionClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EvolutionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self::new(config.base_url(), config.api_key.clone())
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.is_empty() {
                return Err("Evolution API request failed".to_string());
            }
            return Err(body);
        }
        response.json::<T>().await.map_err(|e| e.to_string())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Evolution GET");
        let response = self
            .request(self.http.get(&url))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::read_json(response).await
    }

    /// All upstream chats, normalized. Entries without an id or name are
    /// dropped.
    pub async fn list_chats(&self) -> Result<Vec<ChatSummary>, String> {
        let envelope: ListEnvelope<RawChatPayload> = self.get_json("/chats").await?;
        Ok(envelope
            .into_chats()
            .iter()
            .map(normalize_chat)
            .filter(|chat| !chat.id.is_empty() && !chat.name.is_empty())
            .collect())
    }

    /// One chat's messages, normalized. Entries without an id are dropped.
    pub async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>, String> {
        let encoded = utf8_percent_encode(chat_id, PATH_SEGMENT);
        let envelope: ListEnvelope<RawMessagePayload> =
            self.get_json(&format!("/chats/{}/messages", encoded)).await?;
        Ok(envelope
            .into_messages()
            .iter()
            .map(|raw| normalize_message(raw, ChatKind::Direct))
            .filter(|message| !message.id.is_empty())
            .collect())
    }

    /// Send a text message. Ids containing `@` are full jids and go out as
    /// `chatId`; bare ids are phone numbers and go out as `number`.
    pub async fn send_text(&self, chat_id: &str, message: &str) -> Result<(), String> {
        let payload = if chat_id.contains('@') {
            json!({ "message": message, "chatId": chat_id })
        } else {
            json!({ "message": message, "number": chat_id })
        };

        let url = format!("{}/messages/send", self.base_url);
        debug!(url = %url, "Evolution POST");
        let response = self
            .request(self.http.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.is_empty() {
                return Err("Evolution API request failed".to_string());
            }
            return Err(body);
        }
        Ok(())
    }
}
