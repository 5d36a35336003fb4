//! Canned response texts.
//! The care guidance mirrors what the vet-content pass signed off on;
//! edit wording here, not in the rule table.

/// Opening message when the conversation has no user turn yet.
pub const CONVERSATION_START: &str =
    "Hello! I'm your pet care assistant. How can I help you today?";

/// Asked when the user message is too short to classify.
pub const CLARIFICATION: &str = "I'd love to help you with your pet care question. Could you provide a bit more detail so I can give you the best advice?";

pub const VET_REFERRAL: &str = "If you're looking for a veterinarian, you can use our Vet Finder tool to locate clinics near you. Would you like me to help you navigate to the Vet Finder page?";

pub const VOMITING: &str = "I'm sorry to hear your pet isn't feeling well. Vomiting can be concerning. Make sure to:\n\n\u{2022} Remove food for 12 hours, but provide small amounts of water\n\u{2022} Gradually reintroduce bland food like boiled chicken and rice\n\u{2022} Watch for dehydration signs (dry gums, lethargy)\n\nIf vomiting persists for more than 24 hours, contains blood, or your pet seems lethargic, please see a vet immediately.";

pub const DIARRHEA: &str = "Diarrhea in pets can be uncomfortable and concerning. Here are some care tips:\n\n\u{2022} Ensure they stay hydrated with fresh water\n\u{2022} Try a 12-24 hour fast for adult dogs (no fasting for cats or puppies)\n\u{2022} Introduce a bland diet like plain boiled chicken and rice\n\u{2022} Add a teaspoon of canned pumpkin (not pie filling) for fiber\n\nIf diarrhea continues beyond 48 hours, contains blood, or your pet seems weak, please consult a veterinarian right away.";

pub const FEVER: &str = "A fever in pets can indicate an infection or illness. Normal temperature for dogs is 101.0 to 102.5\u{b0}F (38.3 to 39.2\u{b0}C) and for cats is 100.5 to 102.5\u{b0}F (38 to 39.2\u{b0}C).\n\n\u{2022} Don't give human medications like Tylenol or ibuprofen - they're toxic to pets\n\u{2022} Cool them with a damp towel if temperature is very high\n\u{2022} Make sure they stay hydrated\n\nIf your pet has a fever over 103\u{b0}F (39.4\u{b0}C) or it persists for more than 24 hours, please see a veterinarian as soon as possible.";

pub const EMERGENCY: &str = "\u{26a0}\u{fe0f} If you're experiencing a pet emergency, please contact an emergency vet clinic immediately. Signs of emergency include:\n\n\u{2022} Difficulty breathing\n\u{2022} Severe bleeding\n\u{2022} Collapse or inability to stand\n\u{2022} Suspected poisoning\n\u{2022} Severe trauma or injury\n\nDon't wait - emergency treatment can save your pet's life. Use our Emergency button at the top of the screen to locate the nearest emergency vet clinic.";

pub const GREETING: &str =
    "Hello! I'm your Pet Help assistant. How can I help you with your pet today?";

pub const THANKS: &str = "You're welcome! I'm happy to help. Feel free to ask if you have any other questions about your pet.";

/// Generic replies for messages no rule recognizes; one is picked at random.
pub const FALLBACKS: &[&str] = &[
    "That's a great question about pet care. While I don't have a specific answer for that particular query, I'd recommend consulting with your veterinarian for personalized advice tailored to your pet's needs.",
    "I understand your concern for your pet. This might require specific veterinary advice based on your pet's breed, age, and health history. Is there anything specific about your pet that would help me provide better guidance?",
    "Thanks for sharing about your pet! While I can provide general guidance, remember that each pet is unique. Regular check-ups with your vet are always the best way to ensure your pet stays happy and healthy.",
    "I appreciate your question! Pets can be complex, and what works for one might not work for another. Would you like me to point you to some resources on this topic, or perhaps help you find a veterinarian in your area?",
    "That's an interesting question about pet behavior. Animals communicate in fascinating ways! If you're noticing unusual behavior that concerns you, it might be worth documenting it (maybe even with video) to show your vet at your next appointment.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_pool_has_at_least_five_entries() {
        assert!(FALLBACKS.len() >= 5);
        assert!(FALLBACKS.iter().all(|t| !t.is_empty()));
    }
}
