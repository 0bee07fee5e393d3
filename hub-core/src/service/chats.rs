use std::collections::HashMap;

use crate::db::{self, Database};
use crate::evolution::normalize::display_id;
use crate::evolution::EvolutionClient;
use crate::models::{ChatKind, ChatSummary, Message};
use crate::store::MessageStore;
use crate::timeline;

/// Load every stored message into the in-memory store.
pub fn load_store(db: &Database, store: &MessageStore) -> Result<(), String> {
    let conn = db.0.lock().map_err(|e| e.to_string())?;
    let messages = db::load_all_messages(&conn).map_err(|e| e.to_string())?;
    store.replace(messages)
}

/// Contact list: one entry per `(kind, id)` with its latest message, direct
/// chats enriched with upstream metadata, most recently active first.
pub fn contact_list(
    store: &MessageStore,
    upstream: &[ChatSummary],
) -> Result<Vec<ChatSummary>, String> {
    let messages = store.snapshot()?;
    let latest = timeline::latest_by_conversation(&messages);

    let upstream_by_id: HashMap<&str, &ChatSummary> =
        upstream.iter().map(|chat| (chat.id.as_str(), chat)).collect();

    let mut entries: Vec<ChatSummary> = latest
        .into_iter()
        .map(|((kind, id), message)| {
            let meta = match kind {
                ChatKind::Direct => upstream_by_id.get(id.as_str()).copied(),
                ChatKind::Group => None,
            };
            ChatSummary {
                kind,
                name: meta
                    .map(|chat| chat.name.clone())
                    .unwrap_or_else(|| display_id(&id).to_string()),
                avatar_url: meta.and_then(|chat| chat.avatar_url.clone()),
                unread_count: meta.map(|chat| chat.unread_count).unwrap_or(0),
                last_message: Some(message),
                id,
            }
        })
        .collect();

    timeline::sort_contacts(&mut entries);
    Ok(entries)
}

/// The selected conversation's messages, ascending.
pub fn conversation(
    store: &MessageStore,
    kind: ChatKind,
    chat_id: &str,
) -> Result<Vec<Message>, String> {
    let messages = store.snapshot()?;
    Ok(timeline::conversation_timeline(&messages, kind, chat_id))
}

/// Pull upstream chats and their messages, then replace the store contents.
/// Locally stored group messages are kept; the upstream only covers direct
/// chats. Upstream failure leaves the store untouched.
pub async fn refresh_from_upstream(
    client: &EvolutionClient,
    db: &Database,
    store: &MessageStore,
) -> Result<Vec<ChatSummary>, String> {
    let chats = client.list_chats().await?;

    let mut messages = Vec::new();
    for chat in &chats {
        messages.extend(client.list_messages(&chat.id).await?);
    }

    {
        let conn = db.0.lock().map_err(|e| e.to_string())?;
        for stored in db::load_all_messages(&conn).map_err(|e| e.to_string())? {
            if stored.kind == ChatKind::Group {
                messages.push(stored);
            }
        }
    }

    store.replace(messages)?;
    Ok(chats)
}
