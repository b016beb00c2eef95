//! crates/story_core/src/history.rs
//!
//! Write policy shared by every `StoryCache` implementation.

use crate::domain::Story;

/// Maximum number of stories kept per user.
pub const HISTORY_CAP: usize = 10;

/// Appends `story` unless its id is already present, then evicts the oldest
/// entries until at most `cap` remain. Returns whether the list changed.
pub fn push_bounded(history: &mut Vec<Story>, story: Story, cap: usize) -> bool {
    if history.iter().any(|s| s.id == story.id) {
        return false;
    }
    history.push(story);
    if history.len() > cap {
        let excess = history.len() - cap;
        history.drain(..excess);
    }
    true
}

/// The most recently appended story.
pub fn latest(history: &[Story]) -> Option<&Story> {
    history.last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str) -> Story {
        Story {
            id: id.to_string(),
            title: format!("Title {id}"),
            title_native: None,
            content: "text".to_string(),
            segments: None,
            language: "de".to_string(),
            level: "Beginner".to_string(),
            topic_ids: vec![1],
            vocabulary: None,
        }
    }

    #[test]
    fn evicts_oldest_first() {
        let mut history = Vec::new();
        for i in 0..15 {
            assert!(push_bounded(&mut history, story(&format!("ai_{i}")), HISTORY_CAP));
        }
        assert_eq!(history.len(), HISTORY_CAP);
        let ids: Vec<_> = history.iter().map(|s| s.id.as_str()).collect();
        let expected: Vec<String> = (5..15).map(|i| format!("ai_{i}")).collect();
        assert_eq!(ids, expected);
        assert_eq!(latest(&history).map(|s| s.id.as_str()), Some("ai_14"));
    }

    #[test]
    fn duplicate_id_is_not_appended() {
        let mut history = vec![story("a"), story("b")];
        assert!(!push_bounded(&mut history, story("a"), HISTORY_CAP));
        assert_eq!(history.len(), 2);
        assert_eq!(latest(&history).map(|s| s.id.as_str()), Some("b"));
    }
}
