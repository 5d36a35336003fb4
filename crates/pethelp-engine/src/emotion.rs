//! Emotion tagging for produced replies.
//!
//! This is a second, coarser keyword pass over the *output* text, not the
//! user input: urgency markers first, then positive-sentiment markers, then
//! the thoughtful default.

use pethelp_schema::Emotion;

/// Markers are multi-word where a single word would over-match: "happy to
/// help" tags the acknowledgment reply without tripping on "happy and
/// healthy" in the fallback pool.
const CONCERNED_MARKERS: &[&str] = &[
    "emergency",
    "urgent",
    "immediately",
    "right away",
    "as soon as possible",
    "\u{26a0}",
];

const HAPPY_MARKERS: &[&str] = &["you're welcome", "happy to help", "glad to hear"];

pub fn classify(text: &str) -> Emotion {
    let lower = text.to_lowercase();
    if CONCERNED_MARKERS.iter().any(|m| lower.contains(m)) {
        Emotion::Concerned
    } else if HAPPY_MARKERS.iter().any(|m| lower.contains(m)) {
        Emotion::Happy
    } else {
        Emotion::Thoughtful
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;

    #[test]
    fn urgency_beats_positive_sentiment() {
        let text = "You're welcome! But please see a vet immediately.";
        assert_eq!(classify(text), Emotion::Concerned);
    }

    #[test]
    fn care_templates_read_as_concerned() {
        assert_eq!(classify(templates::VOMITING), Emotion::Concerned);
        assert_eq!(classify(templates::DIARRHEA), Emotion::Concerned);
        assert_eq!(classify(templates::FEVER), Emotion::Concerned);
        assert_eq!(classify(templates::EMERGENCY), Emotion::Concerned);
    }

    #[test]
    fn acknowledgment_reads_as_happy() {
        assert_eq!(classify(templates::THANKS), Emotion::Happy);
    }

    #[test]
    fn neutral_templates_default_to_thoughtful() {
        assert_eq!(classify(templates::GREETING), Emotion::Thoughtful);
        assert_eq!(classify(templates::CONVERSATION_START), Emotion::Thoughtful);
        assert_eq!(classify(templates::CLARIFICATION), Emotion::Thoughtful);
        assert_eq!(classify(templates::VET_REFERRAL), Emotion::Thoughtful);
        for fallback in templates::FALLBACKS {
            assert_eq!(classify(fallback), Emotion::Thoughtful);
        }
    }
}
