//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use story_core::{
    ports::{StoryGenerator, VocabularyStore},
    StoryOrchestrator,
};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<StoryOrchestrator>,
    /// Used directly by the generation relay; the orchestrator holds its own handle.
    pub story_generator: Arc<dyn StoryGenerator>,
    pub vocabulary: Arc<dyn VocabularyStore>,
}
