// Per-user live delivery channels.
//
// A user may hold several sockets at once (tabs, devices), so each user maps
// to a list of (conn_id, sender). Delivery is best effort: a closed receiver
// is pruned on the next send, never reported back to the caller.

use crate::core::gateway::{RealtimeEvent, RealtimeNotifier};
use crate::core::social::UserId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

type Connection = (u64, mpsc::UnboundedSender<RealtimeEvent>);

#[derive(Default)]
pub struct RealtimeHub {
    channels: DashMap<UserId, Vec<Connection>>,
    next_conn_id: AtomicU64,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection for `user_id`. Returns (conn_id, receiver).
    pub fn connect(&self, user_id: UserId) -> (u64, mpsc::UnboundedReceiver<RealtimeEvent>) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels
            .entry(user_id)
            .or_default()
            .push((conn_id, tx));
        (conn_id, rx)
    }

    /// Drop one connection. Other connections of the same user stay registered.
    pub fn disconnect(&self, user_id: UserId, conn_id: u64) {
        if let Some(mut connections) = self.channels.get_mut(&user_id) {
            connections.retain(|(id, _)| *id != conn_id);
        }
        self.channels
            .remove_if(&user_id, |_, connections| connections.is_empty());
    }

    pub fn connection_count(&self, user_id: UserId) -> usize {
        self.channels
            .get(&user_id)
            .map(|connections| connections.len())
            .unwrap_or(0)
    }
}

impl RealtimeNotifier for RealtimeHub {
    fn notify_user(&self, user_id: UserId, event: RealtimeEvent) {
        {
            let Some(mut connections) = self.channels.get_mut(&user_id) else {
                return;
            };
            connections.retain(|(conn_id, tx)| {
                if tx.send(event.clone()).is_ok() {
                    true
                } else {
                    debug!(user_id, conn_id, "Dropping closed realtime connection");
                    false
                }
            });
        }
        // Guard released above; remove_if takes its own lock on the shard
        self.channels
            .remove_if(&user_id, |_, connections| connections.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::social::Message;
    use chrono::Utc;

    fn message_event(id: u64) -> RealtimeEvent {
        RealtimeEvent::Message(Message {
            id,
            sender_id: 1,
            receiver_id: 2,
            content: "hi".to_string(),
            is_read: false,
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_delivers_to_every_connection_of_user() {
        let hub = RealtimeHub::new();
        let (_, mut first) = hub.connect(2);
        let (_, mut second) = hub.connect(2);
        let (_, mut other) = hub.connect(3);

        let event = message_event(1);
        hub.notify_user(2, event.clone());

        assert_eq!(first.recv().await, Some(event.clone()));
        assert_eq!(second.recv().await, Some(event));
        assert!(other.try_recv().is_err());
    }

    #[test]
    fn test_offline_user_is_noop() {
        let hub = RealtimeHub::new();
        hub.notify_user(42, message_event(1));
        assert_eq!(hub.connection_count(42), 0);
    }

    #[test]
    fn test_closed_receivers_are_pruned() {
        let hub = RealtimeHub::new();
        let (_, rx) = hub.connect(5);
        let (_, _live) = hub.connect(5);
        drop(rx);

        hub.notify_user(5, message_event(1));
        assert_eq!(hub.connection_count(5), 1);
    }

    #[test]
    fn test_disconnect_only_removes_that_connection() {
        let hub = RealtimeHub::new();
        let (first, _rx1) = hub.connect(9);
        let (second, _rx2) = hub.connect(9);

        hub.disconnect(9, first);
        assert_eq!(hub.connection_count(9), 1);

        hub.disconnect(9, second);
        assert_eq!(hub.connection_count(9), 0);
    }
}
