use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pethelp_schema::{Message, Role};

use crate::rules::{self, Category, MIN_CLASSIFIABLE_CHARS};
use crate::{emotion, templates};

/// The response engine: one invocation turns one transcript snapshot into
/// the next assistant message.
///
/// The engine does no I/O and never mutates its input. Only the most recent
/// `user` turn is consulted; the rest of the transcript exists for future
/// multi-turn context. Rule matching is deterministic; the fallback path
/// (and template choice within a category, should one ever grow multiple
/// templates) is sampled from the engine's RNG, which is seedable so tests
/// can pin it down.
pub struct Engine {
    rng: Mutex<StdRng>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic engine for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Classify a user utterance without producing a reply.
    /// Returns `None` on both the clarification and fallback paths.
    pub fn classify(text: &str) -> Option<Category> {
        let normalized = text.trim().to_lowercase();
        rules::first_match(&normalized).map(|rule| rule.category)
    }

    /// Produce the next assistant message for `transcript`.
    ///
    /// The returned message carries no timestamp; stamping is the caller's
    /// job. The emotion tag is derived from the produced text.
    pub fn respond(&self, transcript: &[Message]) -> Message {
        let Some(last_user) = transcript.iter().rev().find(|m| m.role == Role::User) else {
            return self.reply(templates::CONVERSATION_START);
        };

        let normalized = last_user.content.trim().to_lowercase();

        if let Some(rule) = rules::first_match(&normalized) {
            tracing::debug!(category = rule.category.as_str(), "matched rule");
            return self.reply(self.pick(rule.templates));
        }

        if normalized.chars().count() < MIN_CLASSIFIABLE_CHARS {
            tracing::debug!(len = normalized.chars().count(), "too short to classify");
            return self.reply(templates::CLARIFICATION);
        }

        tracing::debug!("no rule matched, using fallback pool");
        self.reply(self.pick(templates::FALLBACKS))
    }

    fn reply(&self, content: &str) -> Message {
        Message::assistant(content).with_emotion(emotion::classify(content))
    }

    fn pick(&self, pool: &'static [&'static str]) -> &'static str {
        if pool.len() == 1 {
            return pool[0];
        }
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        pool[rng.gen_range(0..pool.len())]
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pethelp_schema::Emotion;

    fn transcript(text: &str) -> Vec<Message> {
        vec![Message::user(text)]
    }

    #[test]
    fn empty_transcript_gets_the_start_greeting() {
        let engine = Engine::with_seed(1);
        let reply = engine.respond(&[]);
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, templates::CONVERSATION_START);
        assert_eq!(reply.time, None);
    }

    #[test]
    fn transcript_without_user_turn_gets_the_start_greeting() {
        let engine = Engine::with_seed(1);
        let reply = engine.respond(&[Message::assistant("earlier reply")]);
        assert_eq!(reply.content, templates::CONVERSATION_START);
    }

    #[test]
    fn only_the_latest_user_turn_is_consulted() {
        let engine = Engine::with_seed(1);
        let transcript = vec![
            Message::user("my dog has a fever"),
            Message::assistant(templates::FEVER),
            Message::user("now he started vomiting too"),
        ];
        let reply = engine.respond(&transcript);
        assert_eq!(reply.content, templates::VOMITING);
    }

    #[test]
    fn short_input_asks_for_clarification() {
        let engine = Engine::with_seed(1);
        // Matches the vet rule on content but trims to 4 chars.
        let reply = engine.respond(&transcript("vet?"));
        assert_eq!(reply.content, templates::CLARIFICATION);
    }

    #[test]
    fn whitespace_only_input_asks_for_clarification() {
        let engine = Engine::with_seed(1);
        let reply = engine.respond(&transcript("   \n  "));
        assert_eq!(reply.content, templates::CLARIFICATION);
    }

    #[test]
    fn seeded_fallback_is_reproducible() {
        let text = "my parrot keeps plucking its feathers";
        let a = Engine::with_seed(42).respond(&transcript(text));
        let b = Engine::with_seed(42).respond(&transcript(text));
        assert_eq!(a.content, b.content);
        assert!(templates::FALLBACKS.contains(&a.content.as_str()));
    }

    #[test]
    fn classification_is_idempotent() {
        let text = "My dog has diarrhea and a fever";
        assert_eq!(Engine::classify(text), Some(Category::Diarrhea));
        assert_eq!(Engine::classify(text), Some(Category::Diarrhea));
    }

    #[test]
    fn reply_is_valid_input_for_the_next_turn() {
        let engine = Engine::with_seed(1);
        let mut transcript = transcript("my dog has a fever and feels hot");
        let reply = engine.respond(&transcript);
        transcript.push(reply);
        transcript.push(Message::user("thank you so much"));
        let next = engine.respond(&transcript);
        assert_eq!(next.content, templates::THANKS);
        assert_eq!(next.emotion, Some(Emotion::Happy));
    }

    #[test]
    fn input_is_not_mutated() {
        let engine = Engine::with_seed(1);
        let before = transcript("is a fever dangerous for cats");
        let snapshot = before.clone();
        let _ = engine.respond(&before);
        assert_eq!(before, snapshot);
    }
}
