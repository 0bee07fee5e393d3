mod client;
mod events;

pub use client::RealtimeClient;
pub use events::RelayEvent;

use std::sync::OnceLock;

use tokio::sync::mpsc;

use crate::models::Message;

// Global realtime client instance
static REALTIME_CLIENT: OnceLock<RealtimeClient> = OnceLock::new();

pub fn get_realtime_client() -> &'static RealtimeClient {
    REALTIME_CLIENT.get_or_init(RealtimeClient::new)
}

/// Subscribe to both message channels and start the connection loop.
pub async fn init_realtime(inserts: mpsc::UnboundedSender<Message>) -> Result<(), String> {
    let client = get_realtime_client();
    client
        .connect(
            vec!["chat_messages".to_string(), "group_messages".to_string()],
            inserts,
        )
        .await
}
