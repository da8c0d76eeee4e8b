//! Notification fan-out policy.
//!
//! | Event                       | Target                                  | Payload        |
//! |-----------------------------|-----------------------------------------|----------------|
//! | message appended            | conversation topic for the chat key     | full message   |
//! | status transition applied   | original sender's private queue         | status update  |
//! | conversation had expirations| each participant's private queue        | chat key       |
//!
//! The policy only decides targets and payloads. Delivery goes through a
//! [`NotificationSink`], normally the WebSocket [`ConnectionRegistry`].
//!
//! [`ConnectionRegistry`]: crate::websocket::ConnectionRegistry

use crate::models::{ChatKey, ChatMessage, StatusUpdate};
use crate::websocket::message_types::WsOutboundEvent;
use async_trait::async_trait;
use std::fmt;

/// Where a notification is routed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Broadcast topic shared by both participants of a conversation.
    Topic(ChatKey),
    /// Private queue of a single user.
    UserQueue(String),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Topic(key) => write!(f, "/topic/chat/{key}"),
            Channel::UserQueue(user_id) => write!(f, "/user/{user_id}/queue"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub channel: Channel,
    pub event: WsOutboundEvent,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: Notification);
}

pub fn message_appended(message: &ChatMessage) -> Notification {
    Notification {
        channel: Channel::Topic(message.chat_key()),
        event: WsOutboundEvent::Message(message.clone()),
    }
}

pub fn status_applied(original_sender: &str, update: &StatusUpdate) -> Notification {
    Notification {
        channel: Channel::UserQueue(original_sender.to_string()),
        event: WsOutboundEvent::Status(update.clone()),
    }
}

/// One notification per distinct participant; a self-chat yields a single one.
pub fn history_updated(chat_key: &ChatKey, participants: &[String; 2]) -> Vec<Notification> {
    let mut targets: Vec<&String> = participants.iter().collect();
    targets.dedup();

    targets
        .into_iter()
        .map(|user_id| Notification {
            channel: Channel::UserQueue(user_id.clone()),
            event: WsOutboundEvent::HistoryUpdate {
                chat_key: chat_key.clone(),
            },
        })
        .collect()
}
