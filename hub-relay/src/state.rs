use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

/// One subscriber connection on a channel.
struct Subscriber {
    conn_id: u64,
    tx: mpsc::UnboundedSender<String>,
}

/// Relay state: channel name -> subscriber connections.
pub struct RelayState {
    next_conn_id: AtomicU64,
    subscribers: DashMap<String, Vec<Subscriber>>,
}

impl RelayState {
    pub fn new() -> Self {
        Self {
            next_conn_id: AtomicU64::new(1),
            subscribers: DashMap::new(),
        }
    }

    /// Allocate an id for a new connection.
    pub fn register_conn(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Subscribe a connection to a channel.
    pub fn subscribe(&self, conn_id: u64, channel: &str, tx: mpsc::UnboundedSender<String>) {
        self.subscribers
            .entry(channel.to_string())
            .or_default()
            .push(Subscriber { conn_id, tx });
    }

    /// Drop every subscription held by a connection.
    pub fn remove_conn(&self, conn_id: u64) {
        let mut empty_channels = Vec::new();
        for mut entry in self.subscribers.iter_mut() {
            entry.value_mut().retain(|s| s.conn_id != conn_id);
            if entry.value().is_empty() {
                empty_channels.push(entry.key().clone());
            }
        }
        for channel in empty_channels {
            self.subscribers
                .remove_if(&channel, |_, subs| subs.is_empty());
        }
    }

    /// Deliver a frame to every subscriber of a channel except the
    /// publishing connection. Returns the number of deliveries.
    pub fn broadcast(&self, channel: &str, frame: &str, exclude_conn: Option<u64>) -> usize {
        let mut delivered = 0;
        if let Some(subs) = self.subscribers.get(channel) {
            for sub in subs.iter() {
                if Some(sub.conn_id) != exclude_conn && sub.tx.send(frame.to_string()).is_ok() {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.subscribers
            .get(channel)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }

    pub fn channels(&self) -> Vec<String> {
        self.subscribers
            .iter()
            .filter(|e| !e.value().is_empty())
            .map(|e| e.key().clone())
            .collect()
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}
