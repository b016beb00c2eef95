pub mod rest;
pub mod state;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{
    daily_story_handler, generate_story_handler, health_handler, list_vocabulary_handler,
    remove_word_handler, save_word_handler,
};
use state::AppState;

/// All API routes, bound to the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stories/daily", post(daily_story_handler))
        .route("/generate-story", post(generate_story_handler))
        .route(
            "/vocabulary",
            get(list_vocabulary_handler).post(save_word_handler),
        )
        .route("/vocabulary/{word}", delete(remove_word_handler))
        .with_state(app_state)
}
