use std::sync::Mutex;

use crate::models::Message;

/// Flat in-memory message collection shared by the fetch path and the
/// realtime feed.
///
/// Realtime inserts append directly without re-normalizing the full set;
/// derived views are recomputed from a snapshot on each read.
pub struct MessageStore {
    messages: Mutex<Vec<Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Swap in a freshly fetched collection.
    pub fn replace(&self, messages: Vec<Message>) -> Result<(), String> {
        let mut guard = self.messages.lock().map_err(|e| e.to_string())?;
        *guard = messages;
        Ok(())
    }

    /// Append one message (send confirmation or realtime insert).
    pub fn append(&self, message: Message) -> Result<(), String> {
        let mut guard = self.messages.lock().map_err(|e| e.to_string())?;
        guard.push(message);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Vec<Message>, String> {
        let guard = self.messages.lock().map_err(|e| e.to_string())?;
        Ok(guard.clone())
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatKind;

    fn message(id: &str) -> Message {
        Message {
            id: id.to_string(),
            kind: ChatKind::Direct,
            chat_id: "peer".to_string(),
            body: "hi".to_string(),
            from_me: false,
            sender_name: None,
            timestamp: Some(1),
            edited: false,
            reply_to_id: None,
        }
    }

    #[test]
    fn test_replace_then_append() {
        let store = MessageStore::new();
        assert!(store.is_empty());

        store.replace(vec![message("m1"), message("m2")]).unwrap();
        assert_eq!(store.len(), 2);

        store.append(message("m3")).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[2].id, "m3");
    }

    #[test]
    fn test_replace_discards_previous_contents() {
        let store = MessageStore::new();
        store.replace(vec![message("m1")]).unwrap();
        store.replace(vec![message("m2")]).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "m2");
    }
}
