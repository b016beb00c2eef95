//! crates/story_core/src/vocabulary.rs
//!
//! The learner's bookmarked words. Words are matched case-insensitively.

use chrono::{DateTime, Utc};

use crate::domain::{SavedWord, WordAnalysis};

pub const MAX_MASTERY_LEVEL: u8 = 5;

impl SavedWord {
    /// Wraps a freshly bookmarked word at mastery level zero.
    pub fn new(analysis: WordAnalysis, saved_at: DateTime<Utc>) -> Self {
        Self {
            analysis,
            saved_at,
            mastery_level: 0,
        }
    }

    pub fn matches(&self, word: &str) -> bool {
        self.analysis.word.to_lowercase() == word.to_lowercase()
    }
}

pub fn is_word_saved(words: &[SavedWord], word: &str) -> bool {
    words.iter().any(|w| w.matches(word))
}

/// Puts `word` at the front of the list unless it is already saved.
pub fn insert_saved_word(words: &mut Vec<SavedWord>, mut word: SavedWord) -> bool {
    if is_word_saved(words, &word.analysis.word) {
        return false;
    }
    word.mastery_level = word.mastery_level.min(MAX_MASTERY_LEVEL);
    words.insert(0, word);
    true
}

pub fn remove_saved_word(words: &mut Vec<SavedWord>, word: &str) -> bool {
    let before = words.len();
    words.retain(|w| !w.matches(word));
    words.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(word: &str) -> WordAnalysis {
        WordAnalysis {
            word: word.to_string(),
            lemma: word.to_lowercase(),
            translation: "yol".to_string(),
            explanation: "bağlam".to_string(),
            example: format!("{word} ist lang."),
        }
    }

    #[test]
    fn saving_is_case_insensitive_and_newest_first() {
        let mut words = Vec::new();
        assert!(insert_saved_word(&mut words, SavedWord::new(analysis("Reise"), Utc::now())));
        assert!(insert_saved_word(&mut words, SavedWord::new(analysis("Weg"), Utc::now())));
        assert!(!insert_saved_word(&mut words, SavedWord::new(analysis("reise"), Utc::now())));

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].analysis.word, "Weg");
        assert_eq!(words[1].mastery_level, 0);
        assert!(is_word_saved(&words, "WEG"));
    }

    #[test]
    fn remove_matches_any_case() {
        let mut words = vec![SavedWord::new(analysis("Reise"), Utc::now())];
        assert!(!remove_saved_word(&mut words, "Weg"));
        assert!(remove_saved_word(&mut words, "REISE"));
        assert!(words.is_empty());
    }
}
