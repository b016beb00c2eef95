//! crates/story_core/src/domain.rs
//!
//! Defines the core data structures for the story subsystem.
//! Stories are serialized with camelCase keys because the same shape is
//! persisted in the history cache and handed to the mobile client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Language code used whenever a profile has no usable target language.
pub const BASELINE_LANGUAGE: &str = "en";

/// Proficiency level picked during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Level {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The learner profile collected by onboarding. Read-only for this crate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub name: String,
    pub age: String,
    pub native_lang: Option<String>,
    pub target_lang: Option<String>,
    pub purpose: Option<String>,
    pub interests: Vec<u32>,
    pub level: Level,
}

impl UserProfile {
    /// The target language code, or the baseline language when unset.
    pub fn target_lang_or_baseline(&self) -> &str {
        self.target_lang.as_deref().unwrap_or(BASELINE_LANGUAGE)
    }
}

/// One paragraph of a story and its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StorySegment {
    pub target: String,
    pub native: String,
}

/// An annotated vocabulary entry extracted from a generated story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WordAnalysis {
    pub word: String,
    pub lemma: String,
    pub translation: String,
    pub explanation: String,
    pub example: String,
}

/// A bilingual story as shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Story {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_native: Option<String>,
    /// Target-language paragraphs joined by a blank line, used for playback.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<StorySegment>>,
    pub language: String,
    pub level: String,
    pub topic_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<WordAnalysis>>,
}

/// A vocabulary entry the learner bookmarked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SavedWord {
    #[serde(flatten)]
    pub analysis: WordAnalysis,
    pub saved_at: DateTime<Utc>,
    pub mastery_level: u8,
}

/// Coarse lifecycle stage of the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Phase {
    #[default]
    OnboardingEnd,
    ReturningUser,
}

/// Where the story for this call comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorySource {
    /// Reserved; never produced by the decision engine.
    MagicStatic,
    AiDaily,
    Archive,
    Emergency,
}

/// Inputs to the decision engine, rebuilt on every orchestration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionContext {
    pub phase: Phase,
    pub has_story_for_today: bool,
    pub is_offline: bool,
    pub last_story_date: Option<NaiveDate>,
}
