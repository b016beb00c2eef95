//! crates/story_core/src/languages.rs
//!
//! Fixed lookup tables used when describing a profile to the generator.

pub const BASELINE_LANGUAGE_NAME: &str = "English";

const LANGUAGES: &[(&str, &str)] = &[
    ("tr", "Turkish"),
    ("en", "English"),
    ("de", "German"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("it", "Italian"),
];

const TOPICS: &[(u32, &str)] = &[
    (1, "Technology and AI"),
    (2, "Philosophy and Ethics"),
    (3, "Art and Creativity"),
    (4, "Business and Startup Culture"),
    (5, "Nature and Environment"),
    (6, "Science and Space"),
    (7, "Literature and Books"),
    (8, "History and Ancient Civilizations"),
    (9, "Cinema and Movies"),
    (10, "Travel and Adventure"),
];

/// Unknown or missing codes resolve to the baseline language.
pub fn language_name(code: Option<&str>) -> &'static str {
    code.and_then(|code| LANGUAGES.iter().find(|(c, _)| *c == code))
        .map(|(_, name)| *name)
        .unwrap_or(BASELINE_LANGUAGE_NAME)
}

pub fn topic_name(id: u32) -> Option<&'static str> {
    TOPICS.iter().find(|(i, _)| *i == id).map(|(_, name)| *name)
}

/// Comma-separated topic names; unknown ids are skipped.
pub fn topic_list(ids: &[u32]) -> String {
    ids.iter()
        .filter_map(|id| topic_name(*id))
        .collect::<Vec<_>>()
        .join(", ")
}
