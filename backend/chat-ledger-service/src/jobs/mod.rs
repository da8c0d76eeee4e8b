//! Background jobs
//!
//! The expiry sweeper runs on a fixed period for the life of the process and
//! stops when the shutdown broadcast fires.

use crate::services::ChatService;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

pub async fn run_sweeper_loop(
    chat: Arc<ChatService>,
    period: Duration,
    shutdown_signal: broadcast::Receiver<()>,
) {
    let mut interval_timer = interval(period);
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut shutdown = shutdown_signal;

    info!(period_ms = period.as_millis() as u64, "Starting expiry sweeper");

    loop {
        tokio::select! {
            _ = interval_timer.tick() => {
                let report = chat.sweep_expired(Utc::now()).await;
                debug!(
                    scanned = report.scanned,
                    removed = report.removed(),
                    faults = report.faults,
                    "sweep tick"
                );
            }
            _ = shutdown.recv() => {
                info!("Expiry sweeper received shutdown signal");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SendMessageRequest;
    use crate::services::anonymizer::ReceiverRedaction;
    use crate::services::notification::Channel;
    use crate::services::ConversationStore;
    use crate::websocket::message_types::WsOutboundEvent;
    use crate::websocket::ConnectionRegistry;

    #[tokio::test]
    async fn test_sweeper_purges_and_stops_on_shutdown() {
        let registry = ConnectionRegistry::new();
        let chat = Arc::new(ChatService::new(
            Arc::new(ConversationStore::new()),
            Arc::new(registry.clone()),
            ReceiverRedaction::Keep,
        ));
        let (_, mut bob_rx) = registry
            .add_subscriber(Channel::UserQueue("Bob".to_string()))
            .await;

        chat.send_message(SendMessageRequest {
            sender_id: "Alice".to_string(),
            receiver_id: "Bob".to_string(),
            sender_display_name: "Alice".to_string(),
            content: "self-destructing".to_string(),
            destruct_time: Some(Utc::now() - chrono::Duration::seconds(1)),
        })
        .await;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(run_sweeper_loop(
            Arc::clone(&chat),
            Duration::from_millis(20),
            shutdown_rx,
        ));

        let frame = tokio::time::timeout(Duration::from_secs(2), bob_rx.recv())
            .await
            .expect("sweeper never notified Bob")
            .unwrap();
        let event: WsOutboundEvent = serde_json::from_str(&frame).unwrap();
        assert_eq!(event.event_type(), "history_update");
        assert!(chat.history("Alice", "Bob").is_empty());

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
