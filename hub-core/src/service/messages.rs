use tracing::warn;

use crate::audit;
use crate::db::{self, Database};
use crate::models::input::{SendMessageInput, ValidateExt};
use crate::models::{Message, Profile};
use crate::realtime::get_realtime_client;
use crate::store::MessageStore;
use crate::webhook;

/// Result of a send: the stored message plus the outcome of the optional
/// webhook relay step.
#[derive(Debug)]
pub struct SendOutcome {
    pub message: Message,
    /// Set when a webhook is configured and the relay POST failed. The send
    /// itself already succeeded.
    pub webhook_error: Option<String>,
}

/// Compose, persist and relay an outgoing message.
///
/// Empty drafts (after trimming) are silently dropped. The in-memory store
/// is only touched once the insert succeeds; a webhook failure after that
/// never rolls the send back.
pub async fn send_message(
    db: &Database,
    store: &MessageStore,
    sender: &Profile,
    input: SendMessageInput,
) -> Result<Option<SendOutcome>, String> {
    input.validate_input()?;

    let draft = input.body.trim();
    if draft.is_empty() {
        return Ok(None);
    }

    let display_name = sender.display_name();
    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        kind: input.kind,
        chat_id: input.chat_id.clone(),
        body: format!("*#{}:*\n{}", display_name, draft),
        from_me: true,
        sender_name: Some(display_name),
        timestamp: Some(chrono::Utc::now().timestamp_millis()),
        edited: false,
        reply_to_id: input.reply_to_id.clone(),
    };

    // Persist and resolve the webhook inputs while holding the lock; the
    // relay round-trip happens after it is released.
    let (reply, webhook_url) = {
        let conn = db.0.lock().map_err(|e| e.to_string())?;

        db::insert_message(&conn, &message).map_err(|e| e.to_string())?;
        audit::record(
            &conn,
            Some(&sender.email),
            "message.send",
            &format!("{} -> {}", message.kind.channel(), message.chat_id),
        );

        let reply = match message.reply_to_id.as_deref() {
            Some(reply_id) => db::find_message(&conn, message.kind, reply_id)
                .map_err(|e| e.to_string())?,
            None => None,
        };
        let webhook_url = db::get_setting(&conn, "webhook_url").map_err(|e| e.to_string())?;

        (reply, webhook_url)
    };

    store.append(message.clone())?;

    // Other portal instances pick the row up over the relay
    let _ = get_realtime_client().publish(&message);

    let webhook_error = match webhook_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => match webhook::relay(url, &message, reply.as_ref()).await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Webhook relay failed; message is already stored");
                Some(e)
            }
        },
        None => None,
    };

    Ok(Some(SendOutcome {
        message,
        webhook_error,
    }))
}
