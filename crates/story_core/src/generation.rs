//! crates/story_core/src/generation.rs
//!
//! Provider-independent half of the story generator: what is asked for, and
//! how the answer is turned into a [`Story`]. Adapters only move bytes.
//!
//! Parsing fails closed. A payload with a missing or mistyped field, or
//! without exactly [`SEGMENT_COUNT`] usable paragraphs, is rejected as a
//! whole; a partially populated story is never returned.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::domain::{Level, Story, StorySegment, UserProfile, WordAnalysis, BASELINE_LANGUAGE};
use crate::languages::{language_name, topic_list};
use crate::ports::GenerationError;

pub const SEGMENT_COUNT: usize = 3;
pub const MIN_VOCABULARY: usize = 18;
pub const MAX_VOCABULARY: usize = 25;
/// Balances novelty against schema adherence.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

//=========================================================================================
// Request
//=========================================================================================

/// The profile context sent to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StoryRequest {
    pub level: Level,
    pub interests: Vec<u32>,
    pub target_lang: Option<String>,
    pub native_lang: Option<String>,
}

impl From<&UserProfile> for StoryRequest {
    fn from(profile: &UserProfile) -> Self {
        Self {
            level: profile.level,
            interests: profile.interests.clone(),
            target_lang: profile.target_lang.clone(),
            native_lang: profile.native_lang.clone(),
        }
    }
}

/// System and user messages for one generation call.
#[derive(Debug, Clone)]
pub struct StoryPrompt {
    pub system: String,
    pub user: String,
}

impl StoryRequest {
    pub fn prompt(&self) -> StoryPrompt {
        let target = language_name(self.target_lang.as_deref());
        let native = language_name(self.native_lang.as_deref());
        let topics = topic_list(&self.interests);
        let level = self.level;

        let system = format!(
            "You are a linguistic engine with two modes: a creative author writing in {target} \
             and an analytical translator writing in {native}. \
             Respond with a single raw JSON object and nothing else."
        );

        let user = format!(
            r#"USER CONTEXT
- Level: {level}
- Native language: {native}
- Interests: {topics}

TASK 1: STORYTELLING
1. Write a story of 200-300 words in {target}.
2. Split it into EXACTLY {SEGMENT_COUNT} paragraphs.
3. Provide the {native} translation of EACH paragraph.
4. Provide a title in {target} and in {native}.

TASK 2: VOCABULARY
1. Extract {MIN_VOCABULARY}-{MAX_VOCABULARY} key vocabulary items from the story.
2. The "translation" and "explanation" fields MUST be written in {native}.
3. Never write the explanation in {target}. It explains why the word is used in this context.
4. The "example" field is a simple sentence in {target}.

OUTPUT SCHEMA
{{
  "title": "Story title in {target}",
  "title_native": "Story title in {native}",
  "segments": [
    {{ "target": "Paragraph 1 in {target}", "native": "Paragraph 1 in {native}" }},
    {{ "target": "Paragraph 2 in {target}", "native": "Paragraph 2 in {native}" }},
    {{ "target": "Paragraph 3 in {target}", "native": "Paragraph 3 in {native}" }}
  ],
  "level": "{level}",
  "vocabulary": [
    {{
      "word": "word as it appears in the story",
      "lemma": "dictionary form",
      "translation": "meaning in {native}",
      "explanation": "contextual note in {native}",
      "example": "example sentence in {target}"
    }}
  ]
}}"#
        );

        StoryPrompt { system, user }
    }
}

//=========================================================================================
// Response
//=========================================================================================

/// The JSON object the generator is instructed to return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoryPayload {
    pub title: String,
    pub title_native: String,
    pub segments: Vec<StorySegment>,
    pub level: String,
    pub vocabulary: Vec<WordAnalysis>,
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
    })
}

/// Removes a surrounding markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    match code_fence().captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

/// Parses and validates the raw generator output.
pub fn parse_story_payload(raw: &str) -> Result<StoryPayload, GenerationError> {
    let cleaned = strip_code_fence(raw);
    let payload: StoryPayload =
        serde_json::from_str(cleaned).map_err(|e| GenerationError::Schema(e.to_string()))?;

    if payload.segments.len() != SEGMENT_COUNT {
        return Err(GenerationError::Schema(format!(
            "expected {} segments, got {}",
            SEGMENT_COUNT,
            payload.segments.len()
        )));
    }
    if let Some(index) = payload.segments.iter().position(|s| s.target.trim().is_empty()) {
        return Err(GenerationError::Schema(format!("segment {} has no target text", index + 1)));
    }
    if payload.title.trim().is_empty() {
        return Err(GenerationError::Schema("title is empty".to_string()));
    }

    Ok(payload)
}

/// Identifier for a story generated at `at`.
///
/// Millisecond resolution: two stories generated for one user within the same
/// millisecond share an id, and history dedup keeps only the first.
pub fn generated_story_id(at: DateTime<Utc>) -> String {
    format!("ai_{}", at.timestamp_millis())
}

impl StoryPayload {
    pub fn into_story(self, request: &StoryRequest, id: String) -> Story {
        let content = self
            .segments
            .iter()
            .map(|s| s.target.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Story {
            id,
            title: self.title,
            title_native: Some(self.title_native),
            content,
            segments: Some(self.segments),
            language: request
                .target_lang
                .clone()
                .unwrap_or_else(|| BASELINE_LANGUAGE.to_string()),
            level: self.level,
            topic_ids: request.interests.clone(),
            vocabulary: Some(self.vocabulary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> String {
        serde_json::json!({
            "title": "Der Garten",
            "title_native": "The Garden",
            "segments": [
                { "target": "Erster Absatz.", "native": "First paragraph." },
                { "target": "Zweiter Absatz.", "native": "Second paragraph." },
                { "target": "Dritter Absatz.", "native": "Third paragraph." }
            ],
            "level": "Beginner",
            "vocabulary": [
                {
                    "word": "Absatz",
                    "lemma": "Absatz",
                    "translation": "paragraph",
                    "explanation": "Used as a section of text.",
                    "example": "Der Absatz ist kurz."
                }
            ]
        })
        .to_string()
    }

    fn request() -> StoryRequest {
        StoryRequest {
            level: Level::Beginner,
            interests: vec![5, 10],
            target_lang: Some("de".to_string()),
            native_lang: Some("en".to_string()),
        }
    }

    #[test]
    fn builds_story_from_fenced_payload() {
        let raw = format!("```json\n{}\n```", valid_payload());
        let story = parse_story_payload(&raw)
            .unwrap()
            .into_story(&request(), "ai_1".to_string());

        assert_eq!(story.language, "de");
        assert_eq!(story.title_native.as_deref(), Some("The Garden"));
        assert_eq!(story.segments.as_ref().map(Vec::len), Some(3));
        assert_eq!(story.content, "Erster Absatz.\n\nZweiter Absatz.\n\nDritter Absatz.");
        assert_eq!(story.topic_ids, vec![5, 10]);
        assert_eq!(story.vocabulary.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn strips_bare_fences_and_whitespace() {
        assert_eq!(strip_code_fence("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fence("\n{\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_payload()).unwrap();
        value["segments"].as_array_mut().unwrap().pop();
        let err = parse_story_payload(&value.to_string()).unwrap_err();
        assert!(matches!(err, GenerationError::Schema(_)));
    }

    #[test]
    fn rejects_missing_or_mistyped_fields() {
        let mut value: serde_json::Value = serde_json::from_str(&valid_payload()).unwrap();
        value.as_object_mut().unwrap().remove("title_native");
        assert!(matches!(
            parse_story_payload(&value.to_string()),
            Err(GenerationError::Schema(_))
        ));

        let mut value: serde_json::Value = serde_json::from_str(&valid_payload()).unwrap();
        value["vocabulary"][0]["lemma"] = serde_json::json!(7);
        assert!(matches!(
            parse_story_payload(&value.to_string()),
            Err(GenerationError::Schema(_))
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let raw = valid_payload();
        let truncated = &raw[..raw.len() / 2];
        assert!(matches!(parse_story_payload(truncated), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn prompt_names_languages_and_topics() {
        let prompt = request().prompt();
        assert!(prompt.system.contains("German"));
        assert!(prompt.user.contains("Nature and Environment, Travel and Adventure"));
        assert!(prompt.user.contains("MUST be written in English"));
        assert!(prompt.user.contains("\"level\": \"Beginner\""));
    }

    #[test]
    fn story_ids_are_time_based() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(generated_story_id(at), "ai_1700000000123");
    }

    #[test]
    fn same_millisecond_ids_collide_and_dedup_keeps_first() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let later_same_ms = at + chrono::Duration::microseconds(400);
        assert_eq!(generated_story_id(at), generated_story_id(later_same_ms));

        let payload = || parse_story_payload(&valid_payload()).unwrap();
        let first = payload().into_story(&request(), generated_story_id(at));
        let second = payload().into_story(&request(), generated_story_id(later_same_ms));

        let mut history = Vec::new();
        assert!(crate::history::push_bounded(&mut history, first.clone(), crate::history::HISTORY_CAP));
        assert!(!crate::history::push_bounded(&mut history, second, crate::history::HISTORY_CAP));
        assert_eq!(history, vec![first]);
    }
}
