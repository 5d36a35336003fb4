//! YAML configuration, loaded from `<config_root>/config/pethelp.yaml`.
//! Every field is defaulted; a missing file is a valid (default) config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{ChatLimits, RateLimitConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Max messages handed to the engine per turn.
    pub history_limit: usize,
    /// Simulated thinking delay range in ms; null disables it.
    pub thinking_delay_ms: Option<[u64; 2]>,
    pub requests_per_minute: u32,
    pub burst: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,
            thinking_delay_ms: Some([500, 1500]),
            requests_per_minute: 30,
            burst: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides `<config_root>/sessions`.
    pub sessions_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn chat_limits(&self) -> ChatLimits {
        ChatLimits {
            history_limit: self.chat.history_limit,
            thinking_delay_ms: self
                .chat
                .thinking_delay_ms
                .map(|[lo, hi]| (lo.min(hi), lo.max(hi))),
            rate_limit: RateLimitConfig {
                requests_per_minute: self.chat.requests_per_minute,
                burst: self.chat.burst,
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    pub fn sessions_dir(&self, config_root: &Path) -> PathBuf {
        self.storage
            .sessions_dir
            .clone()
            .unwrap_or_else(|| config_root.join("sessions"))
    }
}

pub fn load_config(config_dir: &Path) -> Result<AppConfig> {
    let path = config_dir.join("pethelp.yaml");
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: AppConfig =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}
