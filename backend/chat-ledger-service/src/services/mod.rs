pub mod anonymizer;
pub mod chat_service;
pub mod conversation_store;
pub mod expiry_sweeper;
pub mod notification;
pub mod user_service;

pub use chat_service::ChatService;
pub use conversation_store::ConversationStore;
pub use user_service::UserRegistry;
