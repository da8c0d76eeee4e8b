//! In-process conversation ledger.
//!
//! `chat key -> ordered messages`, sharded by [`DashMap`]. Each conversation sits
//! behind its own lock, so appends to different conversations never contend
//! and whole-store scans only ever hold one conversation at a time.
//!
//! Nothing here is persisted; a restart starts from an empty ledger.

use crate::models::{ChatKey, ChatMessage, MessageStatus};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use uuid::Uuid;

/// One two-party history.
#[derive(Debug)]
pub struct Conversation {
    key: ChatKey,
    /// Fixed at creation, independent of later anonymization of message fields.
    participants: [String; 2],
    messages: Vec<ChatMessage>,
}

impl Conversation {
    fn new(key: ChatKey, a: &str, b: &str) -> Self {
        let mut participants = [a.to_string(), b.to_string()];
        participants.sort();
        Self {
            key,
            participants,
            messages: Vec::new(),
        }
    }

    pub fn key(&self) -> &ChatKey {
        &self.key
    }

    pub fn participants(&self) -> &[String; 2] {
        &self.participants
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages may be edited or dropped, never re-keyed into another conversation.
    pub fn messages_mut(&mut self) -> &mut Vec<ChatMessage> {
        &mut self.messages
    }
}

type ConversationHandle = Arc<RwLock<Conversation>>;

/// Outcome of [`ConversationStore::for_each_conversation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub visited: usize,
    /// Conversations whose callback panicked. The scan continued past them.
    pub faults: usize,
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: DashMap<ChatKey, ConversationHandle>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail of the sender/receiver conversation, creating it on first use.
    pub fn append(&self, message: ChatMessage) -> ChatKey {
        let key = message.chat_key();
        let handle = self.handle_or_create(&key, &message.sender_id, &message.receiver_id);

        handle.write().messages.push(message);
        key
    }

    /// Snapshot of the pair's history; empty when they never talked.
    pub fn history(&self, user_a: &str, user_b: &str) -> Vec<ChatMessage> {
        self.history_by_key(&ChatKey::derive(user_a, user_b))
    }

    pub fn history_by_key(&self, key: &ChatKey) -> Vec<ChatMessage> {
        match self.handle(key) {
            Some(handle) => handle.read().messages.clone(),
            None => Vec::new(),
        }
    }

    /// Advance a message's status in place.
    ///
    /// Returns `true` only when the stored status actually moved forward. Unknown
    /// keys, unknown ids and non-advancing requests all return `false`.
    pub fn update_status(&self, message_id: Uuid, key: &ChatKey, status: MessageStatus) -> bool {
        let Some(handle) = self.handle(key) else {
            return false;
        };

        let mut conversation = handle.write();
        conversation
            .messages
            .iter_mut()
            .find(|message| message.message_id == message_id)
            .map(|message| message.advance_status(status))
            .unwrap_or(false)
    }

    pub fn find_message(&self, key: &ChatKey, message_id: Uuid) -> Option<ChatMessage> {
        let handle = self.handle(key)?;
        let conversation = handle.read();
        conversation
            .messages
            .iter()
            .find(|message| message.message_id == message_id)
            .cloned()
    }

    /// Visit every conversation under its own write lock.
    ///
    /// The set of conversations is snapshotted first, so no store-wide lock is held
    /// while `f` runs. A panic inside `f` is contained to that conversation and
    /// counted in [`ScanOutcome::faults`].
    pub fn for_each_conversation<F>(&self, mut f: F) -> ScanOutcome
    where
        F: FnMut(&mut Conversation),
    {
        let handles: Vec<ConversationHandle> = self
            .conversations
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut outcome = ScanOutcome::default();
        for handle in handles {
            let mut conversation = handle.write();
            outcome.visited += 1;

            if panic::catch_unwind(AssertUnwindSafe(|| f(&mut *conversation))).is_err() {
                outcome.faults += 1;
                tracing::error!(
                    chat_key = %conversation.key,
                    "conversation callback panicked; continuing with remaining conversations"
                );
            }
        }
        outcome
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }

    pub fn message_count(&self, key: &ChatKey) -> usize {
        self.handle(key)
            .map(|handle| handle.read().messages.len())
            .unwrap_or(0)
    }

    fn handle(&self, key: &ChatKey) -> Option<ConversationHandle> {
        // Clone the Arc so the shard guard is released before locking the conversation.
        self.conversations.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn handle_or_create(&self, key: &ChatKey, a: &str, b: &str) -> ConversationHandle {
        let entry = self
            .conversations
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(Conversation::new(key.clone(), a, b))));
        Arc::clone(entry.value())
    }
}
