//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, reachability::HttpReachability, story_llm::OpenAiStoryAdapter},
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use story_core::{
    ports::{AlwaysOnline, NetworkProbe, StoryGenerator, SystemClock},
    StoryOrchestrator,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_client = match &config.openai_api_key {
        Some(key) => {
            let mut openai_config = OpenAIConfig::new().with_api_key(key);
            if let Some(base) = &config.openai_base_url {
                openai_config = openai_config.with_api_base(base);
            }
            Some(Client::with_config(openai_config))
        }
        None => {
            warn!("OPENAI_API_KEY is not set; every story will come from the built-in catalog");
            None
        }
    };
    let story_generator: Arc<dyn StoryGenerator> = Arc::new(OpenAiStoryAdapter::new(
        openai_client,
        config.story_model.clone(),
        config.story_temperature,
    ));

    let probe: Arc<dyn NetworkProbe> = match &config.reachability_url {
        Some(url) => Arc::new(HttpReachability::new(
            url.clone(),
            config.reachability_timeout,
        )?),
        None => Arc::new(AlwaysOnline),
    };

    let orchestrator = StoryOrchestrator::new(
        story_generator.clone(),
        db_adapter.clone(),
        probe,
        Arc::new(SystemClock),
    )
    .with_generation_timeout(config.generation_timeout);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        orchestrator: Arc::new(orchestrator),
        story_generator,
        vocabulary: db_adapter,
    });

    // --- 5. Configure CORS for the mobile and web clients ---
    let allow_origin = if config.cors_origin == "*" {
        AllowOrigin::any()
    } else {
        let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
        })?;
        AllowOrigin::exact(origin)
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static("x-user-id"),
        ]);

    // --- 6. Create the Web Router ---
    let app = Router::new()
        .merge(router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
