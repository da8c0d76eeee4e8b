use crate::models::{ChatKey, ChatMessage, SendMessageRequest, StatusUpdate};
use serde::{Deserialize, Serialize};

/// Inbound WebSocket frames from client to server
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    /// Start receiving the broadcast topic of a conversation.
    #[serde(rename = "subscribe", rename_all = "camelCase")]
    Subscribe { chat_key: ChatKey },

    #[serde(rename = "unsubscribe", rename_all = "camelCase")]
    Unsubscribe { chat_key: ChatKey },

    #[serde(rename = "send_message")]
    SendMessage(SendMessageRequest),

    /// Delivery acknowledgment or read receipt.
    #[serde(rename = "read_receipt")]
    ReadReceipt(StatusUpdate),
}

/// Outbound WebSocket frames from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    /// A message was appended to a conversation the client is subscribed to.
    #[serde(rename = "message")]
    Message(ChatMessage),

    /// One of the client's own messages changed status.
    #[serde(rename = "status")]
    Status(StatusUpdate),

    /// Messages disappeared from the conversation; the client should refetch history.
    #[serde(rename = "history_update", rename_all = "camelCase")]
    HistoryUpdate { chat_key: ChatKey },
}

impl WsOutboundEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Status(_) => "status",
            Self::HistoryUpdate { .. } => "history_update",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
