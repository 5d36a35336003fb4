//! End-to-end behavior of `Engine::respond` against the documented
//! classification contract.

use pethelp_engine::{templates, Category, Engine};
use pethelp_schema::{Emotion, Message, Role};

fn respond_to(text: &str) -> Message {
    Engine::with_seed(7).respond(&[Message::user(text)])
}

#[test]
fn vet_keywords_win_over_every_other_rule() {
    for text in [
        "I need a vet for my dog, he keeps vomiting",
        "which clinic is open, she has diarrhea",
        "the doctor said it could be a fever, is that urgent?",
    ] {
        let reply = respond_to(text);
        assert_eq!(reply.content, templates::VET_REFERRAL, "input: {text}");
    }
}

#[test]
fn diarrhea_precedes_fever() {
    let reply = respond_to("My dog has diarrhea and a fever");
    assert_eq!(reply.content, templates::DIARRHEA);
}

#[test]
fn emergency_reply_is_flagged_concerned() {
    let reply = respond_to("help my pet is dying");
    assert_eq!(reply.content, templates::EMERGENCY);
    assert_eq!(reply.emotion, Some(Emotion::Concerned));
}

#[test]
fn exact_hi_is_greeted() {
    let reply = respond_to("hi");
    assert_eq!(reply.content, templates::GREETING);
    assert_eq!(reply.emotion, Some(Emotion::Thoughtful));
}

#[test]
fn thanks_is_acknowledged_even_when_short() {
    let reply = respond_to("thanks!");
    assert_eq!(reply.content, templates::THANKS);
    assert_eq!(reply.emotion, Some(Emotion::Happy));
}

#[test]
fn short_care_question_requests_clarification() {
    let reply = respond_to("vet?");
    assert_eq!(reply.content, templates::CLARIFICATION);
}

#[test]
fn empty_and_userless_transcripts_yield_identical_greetings() {
    let engine = Engine::with_seed(7);
    let from_empty = engine.respond(&[]);
    let from_system_only = engine.respond(&[Message {
        role: Role::System,
        content: "be nice".into(),
        time: None,
        emotion: None,
    }]);
    assert_eq!(from_empty.content, from_system_only.content);
    assert_eq!(from_empty.content, templates::CONVERSATION_START);
}

#[test]
fn matching_is_case_insensitive() {
    let reply = respond_to("MY CAT HAS A FEVER AND WON'T EAT");
    assert_eq!(reply.content, templates::FEVER);
}

#[test]
fn category_is_stable_across_repeated_calls() {
    let text = "he throws up every time he eats grass";
    for _ in 0..3 {
        assert_eq!(Engine::classify(text), Some(Category::Vomiting));
    }
}

#[test]
fn every_reply_carries_an_emotion_tag() {
    for text in [
        "hi",
        "ok",
        "thanks!",
        "my dog has a fever and shivers",
        "tell me something about hamsters please",
    ] {
        let reply = respond_to(text);
        assert!(reply.emotion.is_some(), "no emotion for input: {text}");
        assert_eq!(reply.role, Role::Assistant);
    }
}
