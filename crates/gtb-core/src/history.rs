use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{Turn, UserId};

/// In-memory per-user conversation history.
///
/// Entries are created lazily by the first successful exchange, fully
/// replaced after each exchange, and deleted on reset. Nothing is persisted;
/// a process restart loses all history.
#[derive(Default)]
pub struct ConversationStore {
    inner: Mutex<HashMap<UserId, Vec<Turn>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current history for a user, empty if none. Does not create an entry.
    pub async fn snapshot(&self, user: UserId) -> Vec<Turn> {
        self.inner
            .lock()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the stored history with the sequence returned by the model.
    pub async fn replace(&self, user: UserId, turns: Vec<Turn>) {
        self.inner.lock().await.insert(user, turns);
    }

    /// Delete a user's history. Returns whether an entry existed.
    pub async fn clear(&self, user: UserId) -> bool {
        self.inner.lock().await.remove(&user).is_some()
    }

    pub async fn has_history(&self, user: UserId) -> bool {
        self.inner.lock().await.contains_key(&user)
    }
}
