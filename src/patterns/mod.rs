// Patterns Module
// Strumming pattern catalog and user pattern loading

mod catalog;
pub mod loader;

pub use loader::{load_patterns_json, validate_pattern, PatternError, MAX_BEATS_PER_BAR};

use crate::strum::types::{Difficulty, StrumPattern};

/// All built-in patterns, easiest first
pub fn all_patterns() -> Vec<StrumPattern> {
    vec![
        catalog::basic_down(),
        catalog::down_up_simple(),
        catalog::old_faithful(),
        catalog::common_time(),
        catalog::bass_strum(),
        catalog::reggae_skank(),
        catalog::boom_chicka(),
        catalog::sixteenth_note(),
    ]
}

/// Get a built-in pattern by id
pub fn get_pattern(id: &str) -> Option<StrumPattern> {
    all_patterns().into_iter().find(|p| p.id == id)
}

pub fn patterns_by_difficulty(difficulty: Difficulty) -> Vec<StrumPattern> {
    all_patterns()
        .into_iter()
        .filter(|p| p.difficulty == difficulty)
        .collect()
}
