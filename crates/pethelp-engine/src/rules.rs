//! The keyword rule table.
//!
//! Rules are static, ordered, and constant for the process lifetime.
//! Matching is first-match-wins over the trimmed, lowercased user text, so
//! reordering this table is how category priority changes — there is no
//! control flow to edit.

use serde::Serialize;

use crate::templates;

/// Minimum trimmed length (in chars) before the care-guidance rules apply.
/// Anything shorter carries too little signal to classify.
pub const MIN_CLASSIFIABLE_CHARS: usize = 10;

/// Response category, in no particular order; priority lives in [`RULES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    VetReferral,
    Vomiting,
    Diarrhea,
    Fever,
    Emergency,
    Greeting,
    Thanks,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VetReferral => "vet_referral",
            Self::Vomiting => "vomiting",
            Self::Diarrhea => "diarrhea",
            Self::Fever => "fever",
            Self::Emergency => "emergency",
            Self::Greeting => "greeting",
            Self::Thanks => "thanks",
        }
    }
}

pub struct Rule {
    pub category: Category,
    /// Substring triggers, matched anywhere in the normalized text.
    pub triggers: &'static [&'static str],
    /// Triggers that must equal the whole normalized text. Used where a
    /// substring would over-match ("hi" is inside "chicken").
    pub exact: &'static [&'static str],
    /// Response texts for this category; one is sampled when several exist.
    pub templates: &'static [&'static str],
    /// Conversational rules carry enough signal on their own and match
    /// even below [`MIN_CLASSIFIABLE_CHARS`].
    pub conversational: bool,
}

impl Rule {
    pub fn matches(&self, text: &str) -> bool {
        self.triggers.iter().any(|t| text.contains(t)) || self.exact.iter().any(|t| *t == text)
    }
}

pub static RULES: &[Rule] = &[
    Rule {
        category: Category::VetReferral,
        triggers: &["vet", "clinic", "doctor"],
        exact: &[],
        templates: &[templates::VET_REFERRAL],
        conversational: false,
    },
    Rule {
        category: Category::Vomiting,
        triggers: &["vomit", "throw", "puke"],
        exact: &[],
        templates: &[templates::VOMITING],
        conversational: false,
    },
    Rule {
        category: Category::Diarrhea,
        triggers: &["diarrhea", "loose stool"],
        exact: &[],
        templates: &[templates::DIARRHEA],
        conversational: false,
    },
    Rule {
        category: Category::Fever,
        triggers: &["fever", "temperature"],
        exact: &[],
        templates: &[templates::FEVER],
        conversational: false,
    },
    Rule {
        category: Category::Emergency,
        triggers: &["emergency", "urgent", "help", "dying"],
        exact: &[],
        templates: &[templates::EMERGENCY],
        conversational: false,
    },
    Rule {
        category: Category::Greeting,
        triggers: &["hello", "hey"],
        exact: &["hi"],
        templates: &[templates::GREETING],
        conversational: true,
    },
    Rule {
        category: Category::Thanks,
        triggers: &["thank"],
        exact: &[],
        templates: &[templates::THANKS],
        conversational: true,
    },
];

/// First rule matching `text` (already trimmed and lowercased), honoring the
/// short-message gate for non-conversational rules.
pub fn first_match(text: &str) -> Option<&'static Rule> {
    let short = text.chars().count() < MIN_CLASSIFIABLE_CHARS;
    RULES
        .iter()
        .find(|rule| (rule.conversational || !short) && rule.matches(text))
}
