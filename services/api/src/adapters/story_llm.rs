//! services/api/src/adapters/story_llm.rs
//!
//! This module contains the adapter for the story-writing LLM.
//! It implements the `StoryGenerator` port from the `core` crate. The provider
//! credential lives only here, on the server.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, FinishReason,
        ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use chrono::Utc;
use story_core::{
    domain::{Story, UserProfile},
    generation::{generated_story_id, parse_story_payload, StoryRequest},
    ports::{GenerationError, StoryGenerator},
};
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StoryGenerator` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiStoryAdapter {
    /// `None` when no credential is configured.
    client: Option<Client<OpenAIConfig>>,
    model: String,
    temperature: f32,
}

impl OpenAiStoryAdapter {
    /// Creates a new `OpenAiStoryAdapter`.
    pub fn new(client: Option<Client<OpenAIConfig>>, model: String, temperature: f32) -> Self {
        Self {
            client,
            model,
            temperature,
        }
    }

    /// Generates a story for an explicit request rather than a full profile.
    pub async fn generate(&self, request: &StoryRequest) -> Result<Story, GenerationError> {
        let client = self
            .client
            .as_ref()
            .ok_or(GenerationError::MissingCredentials)?;

        let prompt = request.prompt();
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.system)
                .build()
                .map_err(request_error)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.user)
                .build()
                .map_err(request_error)?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .temperature(self.temperature)
            .n(1)
            .build()
            .map_err(request_error)?;

        debug!(model = %self.model, level = %request.level, "Requesting story from LLM");

        let response = client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| GenerationError::Transport(e.to_string()))?;

        let raw = extract_content(response)?;
        let payload = parse_story_payload(&raw).inspect_err(|e| {
            warn!(error = %e, "LLM returned a payload outside the story schema");
        })?;

        Ok(payload.into_story(request, generated_story_id(Utc::now())))
    }
}

fn request_error(e: OpenAIError) -> GenerationError {
    GenerationError::Transport(format!("could not build request: {}", e))
}

/// Pulls the generated text out of the first choice, treating a filtered,
/// refused or empty answer as a block.
fn extract_content(response: CreateChatCompletionResponse) -> Result<String, GenerationError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Blocked {
            reason: "no choices returned".to_string(),
        })?;

    if let Some(reason) = choice.message.refusal {
        return Err(GenerationError::Blocked { reason });
    }
    if matches!(choice.finish_reason, Some(FinishReason::ContentFilter)) {
        return Err(GenerationError::Blocked {
            reason: "content_filter".to_string(),
        });
    }

    choice
        .message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| GenerationError::Blocked {
            reason: "Unknown".to_string(),
        })
}

//=========================================================================================
// `StoryGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoryGenerator for OpenAiStoryAdapter {
    async fn generate_daily_story(&self, profile: &UserProfile) -> Result<Story, GenerationError> {
        self.generate(&StoryRequest::from(profile)).await
    }
}
