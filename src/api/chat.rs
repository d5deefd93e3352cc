//! Chat-completion endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::llm::CompletionParams;
use crate::prompt::{tutor_system_prompt, Mode, Scenario};

use super::ApiState;

/// Token cap for tutor replies; short answers hold a child's attention
const MAX_TOKENS: u32 = 150;

/// Sampling temperature for tutor replies
const TEMPERATURE: f32 = 0.7;

/// Chat-completion request body
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    pub message: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub scenario: Option<Scenario>,
}

/// Chat-completion response body
#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub response: String,
}

/// Error body for upstream failures
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Forward a user message to the LLM with the mode-specific instruction
///
/// Single attempt; any upstream failure maps to a 500 with an error body.
async fn chat_completion(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Json<ChatCompletionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let system = tutor_system_prompt(request.mode, request.scenario);

    tracing::debug!(
        mode = ?request.mode,
        scenario = ?request.scenario.map(Scenario::as_str),
        "chat completion requested"
    );

    let params = CompletionParams {
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    };

    match state.llm.complete(&system, &request.message, params).await {
        Ok(response) => Ok(Json(ChatCompletionResponse { response })),
        Err(e) => {
            tracing::error!(error = %e, "chat completion failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to generate response".to_string(),
                }),
            ))
        }
    }
}

/// Build the chat-completion router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat-completion", post(chat_completion))
        .with_state(state)
}
