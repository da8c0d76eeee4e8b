//! Removes self-destructing messages whose destruct time has passed.

use crate::models::ChatKey;
use crate::services::conversation_store::ConversationStore;
use chrono::{DateTime, Utc};

/// A conversation that lost at least one message in a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredConversation {
    pub chat_key: ChatKey,
    pub participants: [String; 2],
    pub removed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub affected: Vec<ExpiredConversation>,
    pub faults: usize,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.affected.iter().map(|c| c.removed).sum()
    }
}

/// Drop every message with `destruct_time < now`, keeping the order of the rest.
///
/// Each conversation is processed under its own lock; a fault in one is logged
/// and counted without stopping the sweep.
pub fn sweep_expired(store: &ConversationStore, now: DateTime<Utc>) -> SweepReport {
    let mut affected = Vec::new();

    let outcome = store.for_each_conversation(|conversation| {
        let messages = conversation.messages_mut();
        let before = messages.len();
        messages.retain(|message| !message.is_expired_at(now));
        let removed = before - messages.len();

        if removed > 0 {
            tracing::debug!(
                chat_key = %conversation.key(),
                removed,
                "expired messages removed"
            );
            affected.push(ExpiredConversation {
                chat_key: conversation.key().clone(),
                participants: conversation.participants().clone(),
                removed,
            });
        }
    });

    SweepReport {
        scanned: outcome.visited,
        affected,
        faults: outcome.faults,
    }
}
