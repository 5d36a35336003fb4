//! File-backed transcript store: one JSONL file per session under a
//! `sessions/` directory. Line one is a header, every following line is a
//! message entry. `save` rewrites the whole file — the transcript is a
//! write-through cache, not an event log.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use pethelp_schema::Message;

use crate::{ConversationStore, SessionSummary, StoreError};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SessionEntry {
    Session {
        version: u32,
        id: String,
        started_at: DateTime<Utc>,
    },
    Message {
        id: Uuid,
        message: Message,
    },
}

pub struct JsonlStore {
    sessions_dir: PathBuf,
}

impl JsonlStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            sessions_dir: root.as_ref().join("sessions"),
        }
    }

    /// Use an explicit sessions directory instead of `<root>/sessions`.
    pub fn with_dir(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
        }
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir.join(format!("{session_id}.jsonl"))
    }
}

#[async_trait]
impl ConversationStore for JsonlStore {
    async fn load(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let path = self.session_path(session_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut messages = Vec::new();
        for (index, line) in content.lines().enumerate() {
            match serde_json::from_str::<SessionEntry>(line) {
                Ok(SessionEntry::Message { message, .. }) => messages.push(message),
                Ok(SessionEntry::Session { .. }) => {}
                Err(error) => {
                    warn!(session_id, line = index + 1, %error, "skipping unparseable session line");
                }
            }
        }
        Ok(messages)
    }

    async fn save(&self, session_id: &str, transcript: &[Message]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.sessions_dir).await?;

        let started_at = transcript
            .iter()
            .find_map(|m| m.time)
            .unwrap_or_else(Utc::now);
        let header = SessionEntry::Session {
            version: FORMAT_VERSION,
            id: session_id.to_owned(),
            started_at,
        };

        let mut lines = Vec::with_capacity(transcript.len() + 1);
        lines.push(serde_json::to_string(&header)?);
        for message in transcript {
            let entry = SessionEntry::Message {
                id: Uuid::new_v4(),
                message: message.clone(),
            };
            lines.push(serde_json::to_string(&entry)?);
        }

        let mut body = lines.join("\n");
        body.push('\n');
        tokio::fs::write(self.session_path(session_id), body).await?;
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(self.session_path(session_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let mut sessions = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.sessions_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(sessions),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                continue;
            }
            let Some(session_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let transcript = self.load(session_id).await?;
            let last_active = transcript.iter().rev().find_map(|m| m.time);
            sessions.push(SessionSummary {
                session_id: session_id.to_owned(),
                message_count: transcript.len(),
                last_active,
            });
        }

        sessions.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        Ok(sessions)
    }
}
