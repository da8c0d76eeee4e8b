use crate::metrics;
use crate::models::{ChatMessage, SendMessageRequest, StatusUpdate, DELETED_USER};
use crate::services::anonymizer::{self, AnonymizeReport, ReceiverRedaction};
use crate::services::conversation_store::ConversationStore;
use crate::services::expiry_sweeper::{self, SweepReport};
use crate::services::notification::{self, NotificationSink};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Entry point for every ledger mutation: applies it to the store, then fans
/// out the resulting notifications.
pub struct ChatService {
    store: Arc<ConversationStore>,
    sink: Arc<dyn NotificationSink>,
    redaction: ReceiverRedaction,
}

impl ChatService {
    pub fn new(
        store: Arc<ConversationStore>,
        sink: Arc<dyn NotificationSink>,
        redaction: ReceiverRedaction,
    ) -> Self {
        Self {
            store,
            sink,
            redaction,
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Stamp id, timestamp and SENT status, append, broadcast on the conversation topic.
    pub async fn send_message(&self, request: SendMessageRequest) -> ChatMessage {
        let message = request.into_message(Utc::now());
        let chat_key = self.store.append(message.clone());
        metrics::record_message_appended();

        tracing::info!(
            %chat_key,
            message_id = %message.message_id,
            self_destruct = message.destruct_time.is_some(),
            "message appended"
        );

        self.sink
            .deliver(notification::message_appended(&message))
            .await;
        message
    }

    pub fn history(&self, user_a: &str, user_b: &str) -> Vec<ChatMessage> {
        self.store.history(user_a, user_b)
    }

    /// Apply a receipt. When the status moved forward, the original sender is
    /// looked up in the conversation and notified on their private queue.
    pub async fn apply_status_update(&self, update: &StatusUpdate) -> bool {
        let applied = self
            .store
            .update_status(update.message_id, &update.chat_key, update.status);
        metrics::record_status_transition(applied, update.status.as_str());

        if !applied {
            tracing::debug!(
                chat_key = %update.chat_key,
                message_id = %update.message_id,
                status = %update.status,
                "status update ignored"
            );
            return false;
        }

        match self.store.find_message(&update.chat_key, update.message_id) {
            // Anonymized senders share one sentinel id; nobody owns that queue.
            Some(message) if message.sender_id == DELETED_USER => tracing::debug!(
                chat_key = %update.chat_key,
                message_id = %update.message_id,
                "sender anonymized, skipping status fan-out"
            ),
            Some(message) => {
                self.sink
                    .deliver(notification::status_applied(&message.sender_id, update))
                    .await;
            }
            None => tracing::warn!(
                chat_key = %update.chat_key,
                message_id = %update.message_id,
                "message disappeared before status fan-out"
            ),
        }
        true
    }

    pub fn anonymize_user(&self, user_id: &str) -> AnonymizeReport {
        let report = anonymizer::anonymize_user(&self.store, user_id, self.redaction);
        metrics::record_messages_anonymized(report.total_rewritten());

        tracing::info!(
            user_id,
            conversations = report.conversations_touched,
            sent = report.sent_rewritten,
            received = report.received_rewritten,
            faults = report.faults,
            "user messages anonymized"
        );
        report
    }

    /// One scheduler tick: purge expired messages and tell both participants of
    /// every affected conversation, once per conversation.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> SweepReport {
        let started = Instant::now();
        let report = expiry_sweeper::sweep_expired(&self.store, now);
        metrics::record_sweep(started.elapsed(), report.removed(), report.faults);

        for conversation in &report.affected {
            for notification in
                notification::history_updated(&conversation.chat_key, &conversation.participants)
            {
                self.sink.deliver(notification).await;
            }
        }

        if report.faults > 0 {
            tracing::warn!(faults = report.faults, "expiry sweep isolated faulty conversations");
        }
        if !report.affected.is_empty() {
            tracing::info!(
                scanned = report.scanned,
                affected = report.affected.len(),
                removed = report.removed(),
                "expiry sweep completed"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatKey, MessageStatus};
    use crate::services::notification::{Channel, Notification};
    use crate::websocket::message_types::WsOutboundEvent;
    use async_trait::async_trait;
    use chrono::Duration;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<Notification> {
            std::mem::take(&mut *self.delivered.lock())
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn deliver(&self, notification: Notification) {
            self.delivered.lock().push(notification);
        }
    }

    fn service() -> (ChatService, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let service = ChatService::new(
            Arc::new(ConversationStore::new()),
            sink.clone(),
            ReceiverRedaction::Keep,
        );
        (service, sink)
    }

    fn request(sender: &str, receiver: &str, destruct_time: Option<DateTime<Utc>>) -> SendMessageRequest {
        SendMessageRequest {
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            sender_display_name: sender.to_string(),
            content: "hello".to_string(),
            destruct_time,
        }
    }

    #[tokio::test]
    async fn test_send_message_broadcasts_on_topic() {
        let (service, sink) = service();

        let message = service.send_message(request("Alice", "Bob", None)).await;

        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(service.history("Bob", "Alice"), vec![message.clone()]);
        assert_eq!(
            sink.take(),
            vec![Notification {
                channel: Channel::Topic(ChatKey::derive("Alice", "Bob")),
                event: WsOutboundEvent::Message(message),
            }]
        );
    }

    #[tokio::test]
    async fn test_read_receipt_notifies_original_sender_once() {
        let (service, sink) = service();
        let message = service.send_message(request("Alice", "Bob", None)).await;
        sink.take();

        let read = StatusUpdate {
            message_id: message.message_id,
            chat_key: ChatKey::derive("Bob", "Alice"),
            status: MessageStatus::Read,
        };
        assert!(service.apply_status_update(&read).await);
        assert_eq!(
            sink.take(),
            vec![Notification {
                channel: Channel::UserQueue("Alice".to_string()),
                event: WsOutboundEvent::Status(read.clone()),
            }]
        );

        let stale = StatusUpdate {
            status: MessageStatus::Delivered,
            ..read
        };
        assert!(!service.apply_status_update(&stale).await);
        assert!(sink.take().is_empty());
        assert_eq!(service.history("Alice", "Bob")[0].status, MessageStatus::Read);
    }

    #[tokio::test]
    async fn test_receipt_for_anonymized_sender_is_applied_but_not_fanned_out() {
        let (service, sink) = service();
        let message = service
            .send_message(request("111111111111111", "222222222222222", None))
            .await;
        service.anonymize_user("111111111111111");
        sink.take();

        let read = StatusUpdate {
            message_id: message.message_id,
            chat_key: message.chat_key(),
            status: MessageStatus::Read,
        };

        assert!(service.apply_status_update(&read).await);
        assert!(sink.take().is_empty());
        assert_eq!(
            service.history("111111111111111", "222222222222222")[0].status,
            MessageStatus::Read
        );
    }

    #[tokio::test]
    async fn test_receipt_for_unknown_message_is_silent() {
        let (service, sink) = service();
        let update = StatusUpdate {
            message_id: uuid::Uuid::new_v4(),
            chat_key: ChatKey::derive("Alice", "Bob"),
            status: MessageStatus::Read,
        };

        assert!(!service.apply_status_update(&update).await);
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_notifies_each_participant_once_per_conversation() {
        let (service, sink) = service();
        let past = Utc::now() - Duration::seconds(1);
        service.send_message(request("Alice", "Bob", Some(past))).await;
        service.send_message(request("Bob", "Alice", Some(past))).await;
        service.send_message(request("Alice", "Bob", None)).await;
        sink.take();

        let report = service.sweep_expired(Utc::now()).await;

        assert_eq!(report.removed(), 2);
        assert_eq!(service.history("Alice", "Bob").len(), 1);

        let key = ChatKey::derive("Alice", "Bob");
        assert_eq!(
            sink.take(),
            vec![
                Notification {
                    channel: Channel::UserQueue("Alice".to_string()),
                    event: WsOutboundEvent::HistoryUpdate {
                        chat_key: key.clone()
                    },
                },
                Notification {
                    channel: Channel::UserQueue("Bob".to_string()),
                    event: WsOutboundEvent::HistoryUpdate { chat_key: key },
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_sweep_without_expirations_is_silent() {
        let (service, sink) = service();
        service.send_message(request("Alice", "Bob", None)).await;
        sink.take();

        service.sweep_expired(Utc::now()).await;
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn test_expiry_still_reaches_survivor_after_anonymization() {
        let (service, sink) = service();
        let soon = Utc::now() + Duration::milliseconds(1);
        service.send_message(request("Alice", "Bob", Some(soon))).await;

        service.anonymize_user("Alice");
        sink.take();

        service
            .sweep_expired(Utc::now() + Duration::seconds(1))
            .await;

        let channels: Vec<_> = sink.take().into_iter().map(|n| n.channel).collect();
        assert!(channels.contains(&Channel::UserQueue("Bob".to_string())));
    }
}
