pub mod chat_key;
pub mod message;
pub mod status;
pub mod user;

pub use chat_key::ChatKey;
pub use message::{ChatMessage, SendMessageRequest, StatusUpdate, DELETED_USER};
pub use status::{MessageStatus, Transition};
pub use user::User;
