//! Rewrites a departed user's authorship across the whole ledger.
//!
//! Content, timestamps, status and destruct time are never touched, and
//! conversations keep their original chat key and participant pair.

use crate::models::DELETED_USER;
use crate::services::conversation_store::ConversationStore;
use std::str::FromStr;

/// What happens to messages the deleted user only received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReceiverRedaction {
    /// Leave received messages untouched.
    #[default]
    Keep,
    /// Replace `receiver_id` on received messages with the sentinel.
    Scrub,
}

impl FromStr for ReceiverRedaction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keep" | "false" | "0" | "" => Ok(ReceiverRedaction::Keep),
            "scrub" | "true" | "1" => Ok(ReceiverRedaction::Scrub),
            other => Err(format!("unknown receiver redaction policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnonymizeReport {
    pub conversations_touched: usize,
    pub sent_rewritten: usize,
    pub received_rewritten: usize,
    pub faults: usize,
}

impl AnonymizeReport {
    pub fn total_rewritten(&self) -> usize {
        self.sent_rewritten + self.received_rewritten
    }
}

/// One-shot sweep: every message sent by `user_id` gets the sentinel as
/// `sender_id` and `sender_display_name`; `receiver_id` is kept.
pub fn anonymize_user(
    store: &ConversationStore,
    user_id: &str,
    redaction: ReceiverRedaction,
) -> AnonymizeReport {
    let mut report = AnonymizeReport::default();

    let outcome = store.for_each_conversation(|conversation| {
        let mut touched = false;

        for message in conversation.messages_mut().iter_mut() {
            if message.sender_id == user_id {
                message.sender_id = DELETED_USER.to_string();
                message.sender_display_name = DELETED_USER.to_string();
                report.sent_rewritten += 1;
                touched = true;
            } else if redaction == ReceiverRedaction::Scrub && message.receiver_id == user_id {
                message.receiver_id = DELETED_USER.to_string();
                report.received_rewritten += 1;
                touched = true;
            }
        }

        if touched {
            report.conversations_touched += 1;
        }
    });

    report.faults = outcome.faults;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatKey, ChatMessage, MessageStatus, SendMessageRequest};
    use chrono::{Duration, Utc};

    fn message(sender: &str, receiver: &str, content: &str) -> ChatMessage {
        SendMessageRequest {
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            sender_display_name: format!("{sender} display"),
            content: content.to_string(),
            destruct_time: Some(Utc::now() + Duration::hours(1)),
        }
        .into_message(Utc::now())
    }

    fn seeded_store() -> ConversationStore {
        let store = ConversationStore::new();
        store.append(message("Alice", "Bob", "a1"));
        store.append(message("Bob", "Alice", "b1"));
        store.append(message("Alice", "Carol", "a2"));
        store.append(message("Carol", "Dave", "c1"));
        store
    }

    #[test]
    fn test_sent_messages_are_anonymized_everywhere() {
        let store = seeded_store();
        let before = store.history("Alice", "Bob");
        let key = ChatKey::derive("Alice", "Bob");
        store.update_status(before[0].message_id, &key, MessageStatus::Read);

        let report = anonymize_user(&store, "Alice", ReceiverRedaction::Keep);

        assert_eq!(report.sent_rewritten, 2);
        assert_eq!(report.received_rewritten, 0);
        assert_eq!(report.conversations_touched, 2);

        let after = store.history("Alice", "Bob");
        let rewritten = &after[0];
        assert_eq!(rewritten.sender_id, DELETED_USER);
        assert_eq!(rewritten.sender_display_name, DELETED_USER);
        assert_eq!(rewritten.receiver_id, "Bob");
        assert_eq!(rewritten.content, before[0].content);
        assert_eq!(rewritten.timestamp, before[0].timestamp);
        assert_eq!(rewritten.destruct_time, before[0].destruct_time);
        assert_eq!(rewritten.message_id, before[0].message_id);
        assert_eq!(rewritten.status, MessageStatus::Read);

        let carol = store.history("Alice", "Carol");
        assert_eq!(carol[0].sender_id, DELETED_USER);
    }

    #[test]
    fn test_received_messages_are_kept_by_default() {
        let store = seeded_store();
        anonymize_user(&store, "Alice", ReceiverRedaction::Keep);

        let received = &store.history("Alice", "Bob")[1];
        assert_eq!(received.sender_id, "Bob");
        assert_eq!(received.receiver_id, "Alice");
        assert_eq!(received.sender_display_name, "Bob display");
    }

    #[test]
    fn test_scrub_policy_rewrites_receiver_side() {
        let store = seeded_store();
        let report = anonymize_user(&store, "Alice", ReceiverRedaction::Scrub);

        assert_eq!(report.received_rewritten, 1);
        let received = &store.history("Alice", "Bob")[1];
        assert_eq!(received.receiver_id, DELETED_USER);
        assert_eq!(received.sender_id, "Bob");
    }

    #[test]
    fn test_unrelated_conversations_are_untouched() {
        let store = seeded_store();
        let before = store.history("Carol", "Dave");

        anonymize_user(&store, "Alice", ReceiverRedaction::Scrub);

        assert_eq!(store.history("Carol", "Dave"), before);
    }

    #[test]
    fn test_history_remains_reachable_by_original_key() {
        let store = seeded_store();
        anonymize_user(&store, "Alice", ReceiverRedaction::Keep);

        assert_eq!(store.history("Bob", "Alice").len(), 2);
        assert_eq!(store.conversation_count(), 3);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("keep".parse(), Ok(ReceiverRedaction::Keep));
        assert_eq!("TRUE".parse(), Ok(ReceiverRedaction::Scrub));
        assert!("sometimes".parse::<ReceiverRedaction>().is_err());
    }
}
