pub mod emotion;
pub mod engine;
pub mod rules;
pub mod templates;

pub use engine::Engine;
pub use rules::{Category, Rule, MIN_CLASSIFIABLE_CHARS, RULES};
