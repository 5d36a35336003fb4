pub mod config;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use thiserror::Error;
use tokio::sync::Mutex as TokioMutex;
use tokio_util::sync::CancellationToken;

use pethelp_engine::Engine;
use pethelp_schema::Message;
use pethelp_store::{ConversationStore, StoreError};

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 30,
            burst: 10,
        }
    }
}

struct TokenBucket {
    tokens: f64,
    max_tokens: f64,
    refill_rate: f64,
    last_refill: chrono::DateTime<Utc>,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        Self {
            tokens: config.burst as f64,
            max_tokens: config.burst as f64,
            refill_rate: config.requests_per_minute as f64 / 60.0,
            last_refill: Utc::now(),
        }
    }

    fn try_consume(&mut self) -> bool {
        let now = Utc::now();
        let elapsed = (now - self.last_refill).num_milliseconds() as f64 / 1000.0;
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-session token bucket, keyed by session id.
pub struct RateLimiter {
    buckets: TokioMutex<HashMap<String, TokenBucket>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: TokioMutex::new(HashMap::new()),
            config,
        }
    }

    pub async fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(&self.config));
        bucket.try_consume()
    }
}

/// Knobs for the send flow.
#[derive(Debug, Clone)]
pub struct ChatLimits {
    /// Max messages handed to the engine per turn. Bounds what an outbound
    /// request would carry; the stored transcript is never truncated.
    pub history_limit: usize,
    /// Simulated thinking delay range in milliseconds; `None` disables it.
    pub thinking_delay_ms: Option<(u64, u64)>,
    pub rate_limit: RateLimitConfig,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            history_limit: 10,
            thinking_delay_ms: Some((500, 1500)),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The send was superseded or aborted before a reply was produced.
    /// No partial message was written.
    #[error("send cancelled")]
    Cancelled,
    #[error("rate limited: too many requests")]
    RateLimited,
    #[error(transparent)]
    Store(#[from] StoreError),
}

struct InFlight {
    seq: u64,
    token: CancellationToken,
}

/// The conversation controller: owns the send flow between the store and
/// the stateless engine.
///
/// One in-flight send per session — a new send for the same session
/// implicitly cancels the outstanding one, which then returns
/// [`GatewayError::Cancelled`]. Cancellation is all-or-nothing: the user
/// turn is written through before the thinking delay, the reply only after
/// it, so a cancelled send never leaves a partial reply behind.
pub struct ChatGateway {
    engine: Arc<Engine>,
    store: Arc<dyn ConversationStore>,
    limits: ChatLimits,
    rate_limiter: RateLimiter,
    in_flight: TokioMutex<HashMap<String, InFlight>>,
    seq: AtomicU64,
}

impl ChatGateway {
    pub fn new(engine: Arc<Engine>, store: Arc<dyn ConversationStore>, limits: ChatLimits) -> Self {
        let rate_limiter = RateLimiter::new(limits.rate_limit.clone());
        Self {
            engine,
            store,
            limits,
            rate_limiter,
            in_flight: TokioMutex::new(HashMap::new()),
            seq: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Run one chat turn: persist the user message, invoke the engine behind
    /// the cancellable thinking delay, persist and return the reply.
    pub async fn handle_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<Message, GatewayError> {
        if !self.rate_limiter.check(session_id).await {
            return Err(GatewayError::RateLimited);
        }

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(prev) = in_flight.insert(
                session_id.to_owned(),
                InFlight {
                    seq,
                    token: token.clone(),
                },
            ) {
                tracing::debug!(session_id, "superseding in-flight send");
                prev.token.cancel();
            }
        }

        let result = self.run_turn(session_id, text, &token).await;

        let mut in_flight = self.in_flight.lock().await;
        if in_flight.get(session_id).is_some_and(|cur| cur.seq == seq) {
            in_flight.remove(session_id);
        }
        result
    }

    /// Cancel the in-flight send for `session_id`, if any.
    pub async fn cancel(&self, session_id: &str) -> bool {
        let in_flight = self.in_flight.lock().await;
        match in_flight.get(session_id) {
            Some(current) => {
                current.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop the stored transcript, cancelling any in-flight send first.
    pub async fn reset(&self, session_id: &str) -> Result<bool, GatewayError> {
        self.cancel(session_id).await;
        Ok(self.store.clear(session_id).await?)
    }

    async fn run_turn(
        &self,
        session_id: &str,
        text: &str,
        token: &CancellationToken,
    ) -> Result<Message, GatewayError> {
        let mut transcript = self.store.load(session_id).await?;
        transcript.push(Message::user(text.trim()).stamped(Utc::now()));
        self.store.save(session_id, &transcript).await?;

        if let Some((lo, hi)) = self.limits.thinking_delay_ms {
            let ms = if lo >= hi {
                lo
            } else {
                rand::thread_rng().gen_range(lo..=hi)
            };
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(session_id, "send cancelled during thinking delay");
                    return Err(GatewayError::Cancelled);
                }
                _ = tokio::time::sleep(Duration::from_millis(ms)) => {}
            }
        }
        if token.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let window_start = transcript.len().saturating_sub(self.limits.history_limit);
        let reply = self
            .engine
            .respond(&transcript[window_start..])
            .stamped(Utc::now());

        if token.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }
        transcript.push(reply.clone());
        self.store.save(session_id, &transcript).await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pethelp_engine::templates;
    use pethelp_schema::Role;
    use pethelp_store::MemoryStore;

    fn gateway(limits: ChatLimits) -> Arc<ChatGateway> {
        Arc::new(ChatGateway::new(
            Arc::new(Engine::with_seed(7)),
            Arc::new(MemoryStore::new()),
            limits,
        ))
    }

    fn instant_limits() -> ChatLimits {
        ChatLimits {
            thinking_delay_ms: None,
            ..ChatLimits::default()
        }
    }

    #[tokio::test]
    async fn turn_persists_user_message_and_reply() {
        let gw = gateway(instant_limits());
        let reply = gw.handle_message("s1", "my dog has a fever").await.unwrap();
        assert_eq!(reply.content, templates::FEVER);
        assert!(reply.time.is_some());

        let transcript = gw.store().load("s1").await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert!(transcript[0].time.is_some());
        assert_eq!(transcript[1], reply);
    }

    #[tokio::test]
    async fn history_cap_bounds_engine_input_not_storage() {
        let limits = ChatLimits {
            history_limit: 2,
            ..instant_limits()
        };
        let gw = gateway(limits);
        gw.handle_message("s1", "hi").await.unwrap();
        gw.handle_message("s1", "my cat keeps vomiting today")
            .await
            .unwrap();

        let transcript = gw.store().load("s1").await.unwrap();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[3].content, templates::VOMITING);
    }

    #[tokio::test(start_paused = true)]
    async fn new_send_supersedes_the_outstanding_one() {
        let limits = ChatLimits {
            thinking_delay_ms: Some((1_000, 1_000)),
            ..ChatLimits::default()
        };
        let gw = gateway(limits);

        let first = {
            let gw = gw.clone();
            tokio::spawn(async move { gw.handle_message("s1", "my dog has a fever").await })
        };
        // Let the first send reach its thinking delay.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let second = gw
            .handle_message("s1", "never mind, he is just vomiting")
            .await
            .unwrap();
        assert_eq!(second.content, templates::VOMITING);

        let first = first.await.unwrap();
        assert!(matches!(first, Err(GatewayError::Cancelled)));

        // Both user turns persisted, exactly one reply.
        let transcript = gw.store().load("s1").await.unwrap();
        assert_eq!(transcript.len(), 3);
        let assistant_turns = transcript
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count();
        assert_eq!(assistant_turns, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_cancel_aborts_the_send() {
        let limits = ChatLimits {
            thinking_delay_ms: Some((1_000, 1_000)),
            ..ChatLimits::default()
        };
        let gw = gateway(limits);

        let send = {
            let gw = gw.clone();
            tokio::spawn(async move { gw.handle_message("s1", "my dog has a fever").await })
        };
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert!(gw.cancel("s1").await);
        let result = send.await.unwrap();
        assert!(matches!(result, Err(GatewayError::Cancelled)));

        // The user turn survives, no reply was written.
        let transcript = gw.store().load("s1").await.unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, Role::User);
    }

    #[tokio::test]
    async fn cancel_without_in_flight_send_is_a_no_op() {
        let gw = gateway(instant_limits());
        assert!(!gw.cancel("s1").await);
    }

    #[tokio::test]
    async fn burst_exhaustion_rate_limits() {
        let limits = ChatLimits {
            rate_limit: RateLimitConfig {
                requests_per_minute: 1,
                burst: 1,
            },
            ..instant_limits()
        };
        let gw = gateway(limits);

        gw.handle_message("s1", "hi").await.unwrap();
        let second = gw.handle_message("s1", "hi").await;
        assert!(matches!(second, Err(GatewayError::RateLimited)));

        // Other sessions have their own bucket.
        gw.handle_message("s2", "hi").await.unwrap();
    }

    #[tokio::test]
    async fn reset_clears_the_transcript() {
        let gw = gateway(instant_limits());
        gw.handle_message("s1", "hi").await.unwrap();
        assert!(gw.reset("s1").await.unwrap());
        assert!(gw.store().load("s1").await.unwrap().is_empty());
        assert!(!gw.reset("s1").await.unwrap());
    }
}
