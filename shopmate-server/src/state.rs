//! In-memory conversation and user state stores.
//!
//! Keys are namespaced per conversation or user inside a single shared
//! [`MemoryStorage`], mirroring the framework-managed state stores the
//! channel SDK would provide. State lives for the process lifetime only.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

/// A process-local key/value store shared by the state wrappers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStorage {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value by key.
    pub async fn read(&self, key: &str) -> Option<Value> {
        self.items.read().await.get(key).cloned()
    }

    /// Write a value, replacing any previous one.
    pub async fn write(&self, key: &str, value: Value) {
        self.items.write().await.insert(key.to_string(), value);
    }

    /// Remove a value by key.
    pub async fn delete(&self, key: &str) {
        self.items.write().await.remove(key);
    }
}

/// Per-conversation state persisted after every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConversationRecord {
    /// Number of turns handled in this conversation.
    pub turn_count: u64,
    /// Id of the most recent inbound activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_id: Option<String>,
}

/// Conversation state store, keyed by conversation id.
#[derive(Debug, Clone)]
pub struct ConversationState {
    storage: MemoryStorage,
}

impl ConversationState {
    /// Wrap a shared storage backend.
    pub fn new(storage: MemoryStorage) -> Self {
        Self { storage }
    }

    fn key(conversation_id: &str) -> String {
        format!("conversation/{conversation_id}")
    }

    /// Load the record for a conversation, defaulting when absent.
    pub async fn load(&self, conversation_id: &str) -> ConversationRecord {
        match self.storage.read(&Self::key(conversation_id)).await {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(conversation_id, error = %e, "discarding unreadable conversation record");
                ConversationRecord::default()
            }),
            None => ConversationRecord::default(),
        }
    }

    /// Persist the record for a conversation.
    pub async fn save(&self, conversation_id: &str, record: ConversationRecord) {
        match serde_json::to_value(&record) {
            Ok(value) => self.storage.write(&Self::key(conversation_id), value).await,
            Err(e) => warn!(conversation_id, error = %e, "failed to serialize conversation record"),
        }
    }
}

/// User state store, keyed by user id.
///
/// Built alongside conversation state; no runtime code path writes it yet
/// (user history tracking is declared but unused).
#[derive(Debug, Clone)]
pub struct UserState {
    storage: MemoryStorage,
}

impl UserState {
    /// Wrap a shared storage backend.
    pub fn new(storage: MemoryStorage) -> Self {
        Self { storage }
    }

    fn key(user_id: &str) -> String {
        format!("user/{user_id}")
    }

    /// Load a user's profile value, if any.
    pub async fn load(&self, user_id: &str) -> Option<Value> {
        self.storage.read(&Self::key(user_id)).await
    }

    /// Persist a user's profile value.
    pub async fn save(&self, user_id: &str, profile: Value) {
        self.storage.write(&Self::key(user_id), profile).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn conversation_records_are_isolated_per_conversation() {
        let state = ConversationState::new(MemoryStorage::new());

        let mut record = state.load("conv-1").await;
        assert_eq!(record, ConversationRecord::default());

        record.turn_count += 1;
        record.last_activity_id = Some("act-1".to_string());
        state.save("conv-1", record.clone()).await;

        assert_eq!(state.load("conv-1").await, record);
        assert_eq!(state.load("conv-2").await, ConversationRecord::default());
    }

    #[tokio::test]
    async fn user_state_shares_the_backing_storage_without_key_collisions() {
        let storage = MemoryStorage::new();
        let conversations = ConversationState::new(storage.clone());
        let users = UserState::new(storage.clone());

        conversations.save("sam", ConversationRecord { turn_count: 3, ..Default::default() }).await;
        users.save("sam", json!({"likes": "mugs"})).await;

        assert_eq!(conversations.load("sam").await.turn_count, 3);
        assert_eq!(users.load("sam").await, Some(json!({"likes": "mugs"})));
    }

    #[tokio::test]
    async fn unreadable_records_reset_to_default() {
        let storage = MemoryStorage::new();
        storage.write("conversation/conv-1", json!("not a record")).await;

        let state = ConversationState::new(storage);
        assert_eq!(state.load("conv-1").await, ConversationRecord::default());
    }
}
