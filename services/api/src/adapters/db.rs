//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of the
//! `StoryCache` and `VocabularyStore` ports from the `core` crate. It handles all
//! interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use story_core::domain::{SavedWord, Story, WordAnalysis};
use story_core::history::{push_bounded, HISTORY_CAP};
use story_core::ports::{PortError, PortResult, StoryCache, VocabularyStore};
use story_core::vocabulary::MAX_MASTERY_LEVEL;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn decode_history(json: &str) -> PortResult<Vec<Story>> {
    serde_json::from_str(json)
        .map_err(|e| PortError::Unexpected(format!("corrupt story history: {}", e)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SavedWordRecord {
    word: String,
    lemma: String,
    translation: String,
    explanation: String,
    example: String,
    saved_at: DateTime<Utc>,
    mastery_level: i16,
}
impl SavedWordRecord {
    fn to_domain(self) -> SavedWord {
        SavedWord {
            analysis: WordAnalysis {
                word: self.word,
                lemma: self.lemma,
                translation: self.translation,
                explanation: self.explanation,
                example: self.example,
            },
            saved_at: self.saved_at,
            mastery_level: self.mastery_level.clamp(0, MAX_MASTERY_LEVEL as i16) as u8,
        }
    }
}

//=========================================================================================
// `StoryCache` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoryCache for DbAdapter {
    async fn get_last_fetch_date(&self, user_id: Uuid) -> PortResult<Option<NaiveDate>> {
        let date: Option<Option<NaiveDate>> =
            sqlx::query_scalar("SELECT last_story_date FROM story_cache WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(date.flatten())
    }

    async fn set_last_fetch_date(&self, user_id: Uuid, date: NaiveDate) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO story_cache (user_id, last_story_date) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET last_story_date = $2, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_history(&self, user_id: Uuid) -> PortResult<Vec<Story>> {
        let json: Option<String> =
            sqlx::query_scalar("SELECT story_history FROM story_cache WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        match json {
            Some(json) => decode_history(&json),
            None => Ok(Vec::new()),
        }
    }

    async fn append_history(&self, user_id: Uuid, story: Story) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("INSERT INTO story_cache (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        // Row lock keeps concurrent appends from losing each other's entries.
        let json: String = sqlx::query_scalar(
            "SELECT story_history FROM story_cache WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        let mut history = decode_history(&json)?;
        if push_bounded(&mut history, story, HISTORY_CAP) {
            let json =
                serde_json::to_string(&history).map_err(|e| PortError::Unexpected(e.to_string()))?;
            sqlx::query(
                "UPDATE story_cache SET story_history = $2, updated_at = NOW() WHERE user_id = $1",
            )
            .bind(user_id)
            .bind(json)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)
    }
}

//=========================================================================================
// `VocabularyStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl VocabularyStore for DbAdapter {
    async fn list_saved_words(&self, user_id: Uuid) -> PortResult<Vec<SavedWord>> {
        let records = sqlx::query_as::<_, SavedWordRecord>(
            "SELECT word, lemma, translation, explanation, example, saved_at, mastery_level
             FROM saved_words WHERE user_id = $1 ORDER BY saved_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn save_word(&self, user_id: Uuid, word: SavedWord) -> PortResult<bool> {
        // The unique (user_id, LOWER(word)) index makes duplicates a no-op.
        let result = sqlx::query(
            "INSERT INTO saved_words
                (user_id, word, lemma, translation, explanation, example, saved_at, mastery_level)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(&word.analysis.word)
        .bind(&word.analysis.lemma)
        .bind(&word.analysis.translation)
        .bind(&word.analysis.explanation)
        .bind(&word.analysis.example)
        .bind(word.saved_at)
        .bind(word.mastery_level as i16)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_word(&self, user_id: Uuid, word: &str) -> PortResult<bool> {
        let result =
            sqlx::query("DELETE FROM saved_words WHERE user_id = $1 AND LOWER(word) = LOWER($2)")
                .bind(user_id)
                .bind(word)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;

        Ok(result.rows_affected() > 0)
    }
}
