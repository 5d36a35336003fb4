//! In-memory store for tests and ephemeral chats.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pethelp_schema::Message;

use crate::{ConversationStore, SessionSummary, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Vec<Message>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn load(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn save(&self, session_id: &str, transcript: &[Message]) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session_id.to_owned(), transcript.to_vec());
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions.remove(session_id).is_some())
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let sessions = self.sessions.lock().await;
        let mut summaries: Vec<SessionSummary> = sessions
            .iter()
            .map(|(id, transcript)| SessionSummary {
                session_id: id.clone(),
                message_count: transcript.len(),
                last_active: transcript.iter().rev().find_map(|m| m.time),
            })
            .collect();
        summaries.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn behaves_like_a_write_through_cache() {
        let store = MemoryStore::new();
        assert!(store.load("s1").await.unwrap().is_empty());

        let transcript = vec![Message::user("hello there").stamped(Utc::now())];
        store.save("s1", &transcript).await.unwrap();
        assert_eq!(store.load("s1").await.unwrap(), transcript);

        assert!(store.clear("s1").await.unwrap());
        assert!(!store.clear("s1").await.unwrap());
    }

    #[tokio::test]
    async fn list_reflects_saved_sessions() {
        let store = MemoryStore::new();
        store
            .save("a", &[Message::user("one").stamped(Utc::now())])
            .await
            .unwrap();
        store.save("b", &[]).await.unwrap();

        let sessions = store.list().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id, "a");
    }
}
