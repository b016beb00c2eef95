//! crates/story_core/src/orchestrator.rs
//!
//! Composes the ports into the single "fetch the best story" operation.
//!
//! `get_story_for_user` has no failure path. Every error raised while
//! executing the chosen source is matched here and resolved to the built-in
//! catalog story for the learner's target language.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::catalog::fallback_story;
use crate::decision::decide_story_source;
use crate::domain::{DecisionContext, Phase, Story, StorySource, UserProfile};
use crate::history;
use crate::ports::{
    Clock, GenerationError, NetworkProbe, PortError, StoryCache, StoryGenerator,
};

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(25);

/// Why the chosen source could not produce a story.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Story generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("Story cache failed: {0}")]
    Storage(#[from] PortError),
    #[error("No archived story to replay")]
    EmptyArchive,
}

/// One async mutex per user; entries are dropped once nobody holds them.
#[derive(Default)]
struct UserLocks {
    inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    fn for_user(&self, user_id: Uuid) -> UserLockEntry<'_> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let lock = map.entry(user_id).or_default().clone();
        UserLockEntry {
            locks: self,
            user_id,
            lock,
        }
    }
}

/// A claim on one user's mutex. Dropping it, including when the owning
/// future is cancelled, removes the map entry if no other claim remains.
struct UserLockEntry<'a> {
    locks: &'a UserLocks,
    user_id: Uuid,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for UserLockEntry<'_> {
    fn drop(&mut self) {
        let mut map = self.locks.inner.lock().unwrap_or_else(|e| e.into_inner());
        // One reference is the map's, the other is ours.
        if map
            .get(&self.user_id)
            .is_some_and(|l| Arc::ptr_eq(l, &self.lock) && Arc::strong_count(l) == 2)
        {
            map.remove(&self.user_id);
        }
    }
}

pub struct StoryOrchestrator {
    generator: Arc<dyn StoryGenerator>,
    cache: Arc<dyn StoryCache>,
    probe: Arc<dyn NetworkProbe>,
    clock: Arc<dyn Clock>,
    generation_timeout: Duration,
    locks: UserLocks,
}

impl StoryOrchestrator {
    pub fn new(
        generator: Arc<dyn StoryGenerator>,
        cache: Arc<dyn StoryCache>,
        probe: Arc<dyn NetworkProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            generator,
            cache,
            probe,
            clock,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            locks: UserLocks::default(),
        }
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Returns the best available story for the learner. Never fails.
    ///
    /// Calls for the same `user_id` are serialized, so a second concurrent
    /// call observes the first one's cache writes.
    pub async fn get_story_for_user(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        phase: Phase,
    ) -> Story {
        let entry = self.locks.for_user(user_id);
        let _guard = entry.lock.lock().await;
        self.acquire_best(user_id, profile, phase).await
    }

    async fn acquire_best(&self, user_id: Uuid, profile: &UserProfile, phase: Phase) -> Story {
        // Re-evaluated on every call so a session spanning midnight rolls over.
        let today = self.clock.today();

        let last_story_date = match self.cache.get_last_fetch_date(user_id).await {
            Ok(date) => date,
            Err(e) => {
                warn!(%user_id, error = %e, "Could not read last story date; assuming none");
                None
            }
        };

        let context = DecisionContext {
            phase,
            has_story_for_today: last_story_date == Some(today),
            is_offline: self.probe.is_offline().await,
            last_story_date,
        };
        debug!(%user_id, ?context, "Built decision context");

        let source = decide_story_source(&context);
        info!(%user_id, ?source, "Story source decided");

        match self.execute(source, user_id, profile, today).await {
            Ok(story) => story,
            Err(AcquisitionError::EmptyArchive) => {
                info!(%user_id, "Archive is empty; serving built-in story");
                fallback_story_for(profile)
            }
            Err(e) => {
                warn!(%user_id, ?source, error = %e, "Story acquisition failed; serving built-in story");
                fallback_story_for(profile)
            }
        }
    }

    async fn execute(
        &self,
        source: StorySource,
        user_id: Uuid,
        profile: &UserProfile,
        today: NaiveDate,
    ) -> Result<Story, AcquisitionError> {
        match source {
            StorySource::AiDaily => self.generate_daily(user_id, profile, today).await,
            StorySource::Archive => {
                let history = self.cache.get_history(user_id).await?;
                history::latest(&history)
                    .cloned()
                    .ok_or(AcquisitionError::EmptyArchive)
            }
            StorySource::Emergency | StorySource::MagicStatic => Ok(fallback_story_for(profile)),
        }
    }

    async fn generate_daily(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
        today: NaiveDate,
    ) -> Result<Story, AcquisitionError> {
        let story = tokio::time::timeout(
            self.generation_timeout,
            self.generator.generate_daily_story(profile),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.generation_timeout))??;

        info!(%user_id, story_id = %story.id, "Generated daily story");

        // The story is already ours; persistence failures are logged only.
        // The date is only advanced once the story is replayable.
        match self.cache.append_history(user_id, story.clone()).await {
            Ok(()) => {
                if let Err(e) = self.cache.set_last_fetch_date(user_id, today).await {
                    error!(%user_id, error = %e, "Failed to record last story date");
                }
            }
            Err(e) => {
                error!(%user_id, story_id = %story.id, error = %e, "Failed to append story to history");
            }
        }

        Ok(story)
    }
}

/// The built-in story for the learner's target language, or the baseline one.
pub fn fallback_story_for(profile: &UserProfile) -> Story {
    fallback_story(profile.target_lang.as_deref())
}
