//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use story_core::{
    domain::{
        Level, Phase, SavedWord, Story, StorySegment, UserProfile, WordAnalysis,
    },
    generation::StoryRequest,
    ports::GenerationError,
};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        daily_story_handler,
        generate_story_handler,
        list_vocabulary_handler,
        save_word_handler,
        remove_word_handler,
    ),
    components(
        schemas(
            DailyStoryRequest, SaveWordResponse, ErrorResponse, StoryRequest, Story,
            StorySegment, WordAnalysis, SavedWord, UserProfile, Phase, Level
        )
    ),
    tags(
        (name = "Daily Story API", description = "Story acquisition and vocabulary endpoints for the language-learning app.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Request payload for the learner's story of the day.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DailyStoryRequest {
    pub profile: UserProfile,
    #[serde(default)]
    pub phase: Phase,
}

/// Result of bookmarking a word.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveWordResponse {
    /// `false` when the word was already in the list.
    pub saved: bool,
    pub word: SavedWord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

type HandlerError = (StatusCode, String);

/// Reads the caller's identity from the `x-user-id` header.
fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, HandlerError> {
    let user_id_str = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;

    Uuid::parse_str(user_id_str).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        )
    })
}

/// Onboarding guarantees distinct languages; requests that skipped it are rejected here.
fn validate_languages(
    native_lang: Option<&str>,
    target_lang: Option<&str>,
) -> Result<(), HandlerError> {
    match (native_lang, target_lang) {
        (Some(native), Some(target)) if native == target => Err((
            StatusCode::BAD_REQUEST,
            "nativeLang and targetLang must differ".to_string(),
        )),
        _ => Ok(()),
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running", body = String))
)]
pub async fn health_handler() -> &'static str {
    "ok"
}

/// Get the best available story for the learner.
///
/// Always answers with a story for a well-formed request: a freshly generated
/// one, today's archived one, or a built-in story.
#[utoipa::path(
    post,
    path = "/stories/daily",
    request_body = DailyStoryRequest,
    responses(
        (status = 200, description = "The story to show", body = Story),
        (status = 400, description = "Bad request (e.g., missing header or identical languages)")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn daily_story_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<DailyStoryRequest>,
) -> Result<Json<Story>, HandlerError> {
    let user_id = user_id_from_headers(&headers)?;
    let profile = request.profile;
    validate_languages(profile.native_lang.as_deref(), profile.target_lang.as_deref())?;

    let story = app_state
        .orchestrator
        .get_story_for_user(user_id, &profile, request.phase)
        .await;
    info!(%user_id, story_id = %story.id, "Serving daily story");

    Ok(Json(story))
}

/// Generate a story directly, without caching or fallback.
///
/// The provider credential stays on the server; clients only send profile context.
#[utoipa::path(
    post,
    path = "/generate-story",
    request_body = StoryRequest,
    responses(
        (status = 200, description = "A freshly generated story", body = Story),
        (status = 400, description = "Bad request"),
        (status = 502, description = "The generator failed or withheld the story", body = ErrorResponse),
        (status = 503, description = "The generator is not configured", body = ErrorResponse),
        (status = 504, description = "The generator did not answer in time", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn generate_story_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<StoryRequest>,
) -> Result<Json<Story>, (StatusCode, Json<ErrorResponse>)> {
    let reject = |(status, error): HandlerError| (status, Json(ErrorResponse { error }));
    let user_id = user_id_from_headers(&headers).map_err(reject)?;
    validate_languages(request.native_lang.as_deref(), request.target_lang.as_deref())
        .map_err(reject)?;

    let profile = UserProfile {
        level: request.level,
        interests: request.interests,
        target_lang: request.target_lang,
        native_lang: request.native_lang,
        ..Default::default()
    };

    let timeout = app_state.config.generation_timeout;
    let outcome = tokio::time::timeout(
        timeout,
        app_state.story_generator.generate_daily_story(&profile),
    )
    .await
    .unwrap_or(Err(GenerationError::Timeout(timeout)));

    match outcome {
        Ok(story) => Ok(Json(story)),
        Err(e) => {
            let status = match e {
                GenerationError::MissingCredentials => StatusCode::SERVICE_UNAVAILABLE,
                GenerationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            warn!(%user_id, error = %e, "Story generation relay failed");
            Err((status, Json(ErrorResponse { error: e.to_string() })))
        }
    }
}

/// List the learner's saved words, newest first.
#[utoipa::path(
    get,
    path = "/vocabulary",
    responses(
        (status = 200, description = "Saved words", body = [SavedWord]),
        (status = 400, description = "Bad request (e.g., missing header)"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn list_vocabulary_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<SavedWord>>, HandlerError> {
    let user_id = user_id_from_headers(&headers)?;
    app_state
        .vocabulary
        .list_saved_words(user_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to list saved words: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list saved words".to_string(),
            )
        })
}

/// Bookmark a word from a story.
#[utoipa::path(
    post,
    path = "/vocabulary",
    request_body = WordAnalysis,
    responses(
        (status = 201, description = "Word saved", body = SaveWordResponse),
        (status = 200, description = "Word was already saved", body = SaveWordResponse),
        (status = 400, description = "Bad request (e.g., missing header)"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn save_word_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(analysis): Json<WordAnalysis>,
) -> Result<(StatusCode, Json<SaveWordResponse>), HandlerError> {
    let user_id = user_id_from_headers(&headers)?;
    if analysis.word.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "word must not be empty".to_string()));
    }

    let word = SavedWord::new(analysis, Utc::now());
    let saved = app_state
        .vocabulary
        .save_word(user_id, word.clone())
        .await
        .map_err(|e| {
            error!("Failed to save word: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save word".to_string(),
            )
        })?;

    let status = if saved { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(SaveWordResponse { saved, word })))
}

/// Remove a saved word (case-insensitive).
#[utoipa::path(
    delete,
    path = "/vocabulary/{word}",
    responses(
        (status = 204, description = "Word removed"),
        (status = 404, description = "Word was not saved"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("word" = String, Path, description = "The word to remove."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn remove_word_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(word): Path<String>,
) -> Result<StatusCode, HandlerError> {
    let user_id = user_id_from_headers(&headers)?;
    let removed = app_state
        .vocabulary
        .remove_word(user_id, &word)
        .await
        .map_err(|e| {
            error!("Failed to remove word: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to remove word".to_string(),
            )
        })?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("'{}' is not saved", word)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use std::time::Duration;
    use story_core::{
        catalog::catalog_story,
        memory::{InMemoryStoryCache, InMemoryVocabulary},
        ports::{AlwaysOnline, StoryGenerator, SystemClock},
        StoryOrchestrator,
    };

    struct FailingGenerator;

    #[async_trait]
    impl StoryGenerator for FailingGenerator {
        async fn generate_daily_story(&self, _: &UserProfile) -> Result<Story, GenerationError> {
            Err(GenerationError::Transport("provider unreachable".to_string()))
        }
    }

    struct StalledGenerator;

    #[async_trait]
    impl StoryGenerator for StalledGenerator {
        async fn generate_daily_story(&self, _: &UserProfile) -> Result<Story, GenerationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(GenerationError::Transport("too late".to_string()))
        }
    }

    fn test_config(generation_timeout: Duration) -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            database_url: "postgres://unused".to_string(),
            log_level: tracing::Level::INFO,
            openai_api_key: None,
            openai_base_url: None,
            story_model: "gpt-4o-mini".to_string(),
            story_temperature: 0.7,
            generation_timeout,
            reachability_url: None,
            reachability_timeout: Duration::from_millis(100),
            cors_origin: "*".to_string(),
        }
    }

    fn state() -> Arc<AppState> {
        state_with(Arc::new(FailingGenerator), Duration::from_secs(1))
    }

    fn state_with(generator: Arc<dyn StoryGenerator>, generation_timeout: Duration) -> Arc<AppState> {
        let orchestrator = StoryOrchestrator::new(
            generator.clone(),
            Arc::new(InMemoryStoryCache::new()),
            Arc::new(AlwaysOnline),
            Arc::new(SystemClock),
        );
        Arc::new(AppState {
            config: Arc::new(test_config(generation_timeout)),
            orchestrator: Arc::new(orchestrator),
            story_generator: generator,
            vocabulary: Arc::new(InMemoryVocabulary::new()),
        })
    }

    fn headers(user_id: Uuid) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", user_id.to_string().parse().unwrap());
        headers
    }

    fn profile(native: &str, target: &str) -> UserProfile {
        UserProfile {
            name: "Deniz".to_string(),
            age: "31".to_string(),
            native_lang: Some(native.to_string()),
            target_lang: Some(target.to_string()),
            purpose: Some("career".to_string()),
            interests: vec![4],
            level: Level::Intermediate,
        }
    }

    fn word(text: &str) -> WordAnalysis {
        WordAnalysis {
            word: text.to_string(),
            lemma: text.to_lowercase(),
            translation: "yolculuk".to_string(),
            explanation: "Hikayedeki ana tema.".to_string(),
            example: "Die Reise war lang.".to_string(),
        }
    }

    #[tokio::test]
    async fn daily_story_falls_back_when_generation_fails() {
        let request = DailyStoryRequest {
            profile: profile("tr", "de"),
            phase: Phase::OnboardingEnd,
        };

        let Json(story) =
            daily_story_handler(State(state()), headers(Uuid::new_v4()), Json(request))
                .await
                .unwrap();

        assert_eq!(Some(story), catalog_story("de"));
    }

    #[tokio::test]
    async fn daily_story_requires_user_header() {
        let request = DailyStoryRequest {
            profile: profile("tr", "de"),
            phase: Phase::ReturningUser,
        };
        let err = daily_story_handler(State(state()), HeaderMap::new(), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn identical_languages_are_rejected() {
        let request = DailyStoryRequest {
            profile: profile("de", "de"),
            phase: Phase::OnboardingEnd,
        };
        let err = daily_story_handler(State(state()), headers(Uuid::new_v4()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn phase_defaults_to_onboarding_end() {
        let request: DailyStoryRequest = serde_json::from_value(serde_json::json!({
            "profile": {
                "name": "Deniz", "age": "31", "nativeLang": "tr", "targetLang": "de",
                "purpose": null, "interests": [1, 2], "level": "Beginner"
            }
        }))
        .unwrap();
        assert_eq!(request.phase, Phase::OnboardingEnd);
        assert_eq!(request.profile.level, Level::Beginner);
    }

    #[tokio::test]
    async fn generation_relay_surfaces_failures() {
        let request = StoryRequest {
            level: Level::Advanced,
            interests: vec![2],
            target_lang: Some("fr".to_string()),
            native_lang: Some("en".to_string()),
        };
        let (status, Json(body)) =
            generate_story_handler(State(state()), headers(Uuid::new_v4()), Json(request))
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.error.contains("provider unreachable"));
    }

    #[tokio::test]
    async fn generation_relay_gives_up_on_stalled_provider() {
        let state = state_with(Arc::new(StalledGenerator), Duration::from_millis(100));
        let request = StoryRequest {
            level: Level::Beginner,
            interests: vec![3],
            target_lang: Some("es".to_string()),
            native_lang: Some("en".to_string()),
        };

        let relay = generate_story_handler(State(state), headers(Uuid::new_v4()), Json(request));
        let (status, Json(body)) = tokio::time::timeout(Duration::from_secs(2), relay)
            .await
            .expect("relay must honour the configured generation timeout")
            .unwrap_err();

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(body.error.contains("timed out"), "unexpected error: {}", body.error);
    }

    #[tokio::test]
    async fn vocabulary_save_list_remove() {
        let state = state();
        let user = Uuid::new_v4();

        let (status, Json(first)) =
            save_word_handler(State(state.clone()), headers(user), Json(word("Reise")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(first.saved);

        let (status, Json(again)) =
            save_word_handler(State(state.clone()), headers(user), Json(word("reise")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(!again.saved);

        let Json(words) = list_vocabulary_handler(State(state.clone()), headers(user))
            .await
            .unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].mastery_level, 0);

        let status = remove_word_handler(State(state.clone()), headers(user), Path("REISE".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = remove_word_handler(State(state), headers(user), Path("Reise".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
