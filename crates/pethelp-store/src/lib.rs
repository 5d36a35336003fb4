pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use pethelp_schema::Message;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub message_count: usize,
    pub last_active: Option<DateTime<Utc>>,
}

/// Write-through persistence for conversation transcripts, keyed by session
/// id. The response engine never touches this — only the controller does.
///
/// A session that was never saved loads as an empty transcript; `clear`
/// reports whether anything was actually removed.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Vec<Message>, StoreError>;
    async fn save(&self, session_id: &str, transcript: &[Message]) -> Result<(), StoreError>;
    async fn clear(&self, session_id: &str) -> Result<bool, StoreError>;
    async fn list(&self) -> Result<Vec<SessionSummary>, StoreError>;
}
