//! crates/story_core/src/ports.rs
//!
//! Defines the service contracts (traits) the story core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the LLM provider, the database and the network probe.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::{SavedWord, Story, UserProfile};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for storage port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Every way the remote story generator can fail.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Story generator credentials are not configured")]
    MissingCredentials,
    #[error("Generator withheld the story. Reason: {reason}")]
    Blocked { reason: String },
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Generated payload does not match the story schema: {0}")]
    Schema(String),
    #[error("Story generation timed out after {0:?}")]
    Timeout(Duration),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Produces a fresh, fully populated story for the given profile.
    async fn generate_daily_story(&self, profile: &UserProfile) -> Result<Story, GenerationError>;
}

/// Persisted story metadata and history, keyed by the owning user.
#[async_trait]
pub trait StoryCache: Send + Sync {
    async fn get_last_fetch_date(&self, user_id: Uuid) -> PortResult<Option<NaiveDate>>;

    async fn set_last_fetch_date(&self, user_id: Uuid, date: NaiveDate) -> PortResult<()>;

    /// Oldest entry first.
    async fn get_history(&self, user_id: Uuid) -> PortResult<Vec<Story>>;

    /// Appends under the bounded FIFO policy of [`crate::history::push_bounded`].
    async fn append_history(&self, user_id: Uuid, story: Story) -> PortResult<()>;
}

#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// Returns `true` when the story generator is unreachable. Never fails.
    async fn is_offline(&self) -> bool;
}

/// A probe for deployments without a reachability target.
pub struct AlwaysOnline;

#[async_trait]
impl NetworkProbe for AlwaysOnline {
    async fn is_offline(&self) -> bool {
        false
    }
}

pub trait Clock: Send + Sync {
    /// The current calendar day.
    fn today(&self) -> NaiveDate;
}

/// Calendar days in UTC.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

#[async_trait]
pub trait VocabularyStore: Send + Sync {
    /// Newest first.
    async fn list_saved_words(&self, user_id: Uuid) -> PortResult<Vec<SavedWord>>;

    /// Returns `false` when the word was already saved.
    async fn save_word(&self, user_id: Uuid, word: SavedWord) -> PortResult<bool>;

    /// Returns `false` when nothing matched.
    async fn remove_word(&self, user_id: Uuid, word: &str) -> PortResult<bool>;
}
