use crate::services::notification::{Channel, Notification, NotificationSink};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod message_types;

/// Unique identifier for a WebSocket subscriber
///
/// Each subscription gets its own id so a closing connection removes exactly
/// its own entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscriber {
    id: SubscriberId,
    sender: UnboundedSender<String>,
}

/// Connection registry for WebSocket subscribers
///
/// Maps conversation topics and private user queues to the live connections
/// listening on them.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    // channel -> list of subscribers
    inner: Arc<RwLock<HashMap<Channel, Vec<Subscriber>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a channel.
    ///
    /// Returns the subscription id (for cleanup) and the receiver of serialized frames.
    pub async fn add_subscriber(&self, channel: Channel) -> (SubscriberId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        let subscribers = guard.entry(channel.clone()).or_default();
        subscribers.push(Subscriber {
            id: subscriber_id,
            sender: tx,
        });

        tracing::debug!(
            %channel,
            ?subscriber_id,
            total = subscribers.len(),
            "added subscriber"
        );

        (subscriber_id, rx)
    }

    /// Remove a specific subscriber. Must be called when a connection closes.
    pub async fn remove_subscriber(&self, channel: &Channel, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write().await;

        if let Some(subscribers) = guard.get_mut(channel) {
            subscribers.retain(|s| s.id != subscriber_id);

            if subscribers.is_empty() {
                guard.remove(channel);
                tracing::debug!(%channel, "removed empty channel from registry");
            }
        }
    }

    /// Send a frame to every subscriber of a channel, dropping dead ones.
    pub async fn broadcast(&self, channel: &Channel, msg: String) {
        let mut guard = self.inner.write().await;
        let Some(subscribers) = guard.get_mut(channel) else {
            return;
        };

        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.sender.send(msg.clone()).is_ok());
        let after = subscribers.len();

        if before != after {
            tracing::debug!(
                %channel,
                dead = before - after,
                active = after,
                "cleaned up dead subscribers during broadcast"
            );
        }
        if after == 0 {
            guard.remove(channel);
        }
    }

    pub async fn subscriber_count(&self, channel: &Channel) -> usize {
        let guard = self.inner.read().await;
        guard.get(channel).map(|v| v.len()).unwrap_or(0)
    }
}

#[async_trait]
impl NotificationSink for ConnectionRegistry {
    async fn deliver(&self, notification: Notification) {
        match notification.event.to_json() {
            Ok(payload) => self.broadcast(&notification.channel, payload).await,
            Err(e) => tracing::error!(
                channel = %notification.channel,
                event_type = notification.event.event_type(),
                error = %e,
                "failed to serialize outbound event"
            ),
        }
    }
}
