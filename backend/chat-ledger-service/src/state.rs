use crate::config::Config;
use crate::services::{ChatService, ConversationStore, UserRegistry};
use crate::websocket::ConnectionRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub users: Arc<UserRegistry>,
    pub registry: ConnectionRegistry,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire an empty ledger whose notifications fan out through the WebSocket registry.
    pub fn new(config: Config) -> Self {
        let registry = ConnectionRegistry::new();
        let chat = ChatService::new(
            Arc::new(ConversationStore::new()),
            Arc::new(registry.clone()),
            config.receiver_redaction,
        );

        Self {
            chat: Arc::new(chat),
            users: Arc::new(UserRegistry::new()),
            registry,
            config: Arc::new(config),
        }
    }
}
