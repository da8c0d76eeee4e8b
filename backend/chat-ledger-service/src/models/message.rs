use super::chat_key::ChatKey;
use super::status::{MessageStatus, Transition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Replaces identity fields of a departed user.
pub const DELETED_USER: &str = "Deleted User";

/// A message as held in a conversation history.
///
/// Field names follow the browser client's camelCase wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: Uuid,
    pub sender_id: String,
    pub receiver_id: String,
    /// Snapshot of the sender's display name at send time.
    pub sender_display_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destruct_time: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn chat_key(&self) -> ChatKey {
        ChatKey::derive(&self.sender_id, &self.receiver_id)
    }

    /// Self-destructing messages expire once their destruct time is strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.destruct_time, Some(destruct_time) if destruct_time < now)
    }

    /// Move the status forward in place. Returns whether anything changed.
    pub fn advance_status(&mut self, requested: MessageStatus) -> bool {
        match self.status.transition(requested) {
            Transition::Applied { to, .. } => {
                self.status = to;
                true
            }
            Transition::Ignored => false,
        }
    }
}

/// Inbound "send message" payload. The server assigns id, timestamp and status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default)]
    pub sender_display_name: String,
    pub content: String,
    #[serde(default)]
    pub destruct_time: Option<DateTime<Utc>>,
}

impl SendMessageRequest {
    pub fn into_message(self, now: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            message_id: Uuid::new_v4(),
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            sender_display_name: self.sender_display_name,
            content: self.content,
            timestamp: now,
            status: MessageStatus::Sent,
            destruct_time: self.destruct_time,
        }
    }
}

/// Read receipt / delivery acknowledgment. Carries the chat key but not the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub message_id: Uuid,
    pub chat_key: ChatKey,
    pub status: MessageStatus,
}
