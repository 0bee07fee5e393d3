//! Best-effort webhook relay for sent messages.

use serde::Serialize;

use crate::models::Message;

/// Message as it goes out to the webhook: the internal source-kind tag stays
/// internal.
#[derive(Debug, Serialize)]
pub struct WebhookMessage {
    pub id: String,
    pub chat_id: String,
    pub body: String,
    pub from_me: bool,
    pub sender_name: Option<String>,
    pub timestamp: Option<i64>,
    pub reply_to_id: Option<String>,
}

impl From<&Message> for WebhookMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            chat_id: message.chat_id.clone(),
            body: message.body.clone(),
            from_me: message.from_me,
            sender_name: message.sender_name.clone(),
            timestamp: message.timestamp,
            reply_to_id: message.reply_to_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub reply: Option<WebhookMessage>,
    pub message: WebhookMessage,
}

/// POST the sent message (and the message it replied to, if any) to the
/// configured URL. The caller decides what a failure means; nothing is
/// retried or rolled back here.
pub async fn relay(url: &str, message: &Message, reply: Option<&Message>) -> Result<(), String> {
    let payload = WebhookPayload {
        reply: reply.map(WebhookMessage::from),
        message: WebhookMessage::from(message),
    };

    let response = reqwest::Client::new()
        .post(url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("Webhook responded with status {}", response.status()));
    }
    Ok(())
}
