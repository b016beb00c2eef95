//! crates/story_core/src/memory.rs
//!
//! In-process implementations of the storage ports. The story history is
//! kept as serialized JSON text, the same representation the database uses,
//! so replays go through a real serialize/deserialize cycle.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{SavedWord, Story};
use crate::history::{push_bounded, HISTORY_CAP};
use crate::ports::{PortError, PortResult, StoryCache, VocabularyStore};
use crate::vocabulary::{insert_saved_word, remove_saved_word};

#[derive(Default)]
struct CacheEntry {
    last_story_date: Option<NaiveDate>,
    story_history: Option<String>,
}

/// A `StoryCache` held in memory.
#[derive(Default)]
pub struct InMemoryStoryCache {
    entries: RwLock<HashMap<Uuid, CacheEntry>>,
}

impl InMemoryStoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything stored for `user_id`.
    pub async fn reset(&self, user_id: Uuid) {
        self.entries.write().await.remove(&user_id);
    }
}

fn decode_history(json: Option<&str>) -> PortResult<Vec<Story>> {
    match json {
        Some(json) => serde_json::from_str(json).map_err(|e| PortError::Unexpected(e.to_string())),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl StoryCache for InMemoryStoryCache {
    async fn get_last_fetch_date(&self, user_id: Uuid) -> PortResult<Option<NaiveDate>> {
        Ok(self
            .entries
            .read()
            .await
            .get(&user_id)
            .and_then(|e| e.last_story_date))
    }

    async fn set_last_fetch_date(&self, user_id: Uuid, date: NaiveDate) -> PortResult<()> {
        self.entries
            .write()
            .await
            .entry(user_id)
            .or_default()
            .last_story_date = Some(date);
        Ok(())
    }

    async fn get_history(&self, user_id: Uuid) -> PortResult<Vec<Story>> {
        let entries = self.entries.read().await;
        decode_history(entries.get(&user_id).and_then(|e| e.story_history.as_deref()))
    }

    async fn append_history(&self, user_id: Uuid, story: Story) -> PortResult<()> {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(user_id).or_default();
        let mut history = decode_history(entry.story_history.as_deref())?;
        if push_bounded(&mut history, story, HISTORY_CAP) {
            let json =
                serde_json::to_string(&history).map_err(|e| PortError::Unexpected(e.to_string()))?;
            entry.story_history = Some(json);
        }
        Ok(())
    }
}

/// A `VocabularyStore` held in memory.
#[derive(Default)]
pub struct InMemoryVocabulary {
    words: RwLock<HashMap<Uuid, Vec<SavedWord>>>,
}

impl InMemoryVocabulary {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VocabularyStore for InMemoryVocabulary {
    async fn list_saved_words(&self, user_id: Uuid) -> PortResult<Vec<SavedWord>> {
        Ok(self.words.read().await.get(&user_id).cloned().unwrap_or_default())
    }

    async fn save_word(&self, user_id: Uuid, word: SavedWord) -> PortResult<bool> {
        let mut words = self.words.write().await;
        Ok(insert_saved_word(words.entry(user_id).or_default(), word))
    }

    async fn remove_word(&self, user_id: Uuid, word: &str) -> PortResult<bool> {
        let mut words = self.words.write().await;
        Ok(words
            .get_mut(&user_id)
            .map(|list| remove_saved_word(list, word))
            .unwrap_or(false))
    }
}
