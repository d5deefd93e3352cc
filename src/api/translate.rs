//! Translation endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::languages;
use crate::llm::CompletionParams;
use crate::prompt::translation_system_prompt;

use super::chat::ErrorResponse;
use super::ApiState;

/// Token cap for translations
const MAX_TOKENS: u32 = 200;

/// Low temperature keeps translations literal
const TEMPERATURE: f32 = 0.3;

/// Translation request body
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(rename = "targetLanguage")]
    pub target_language: String,
    #[serde(default)]
    pub context: String,
}

/// Translation response body
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
}

/// Translate text into the learner's native language
///
/// Unknown target codes get a generic display label rather than an error.
/// Single attempt; any upstream failure maps to a 500 with an error body.
async fn translate(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let target = languages::display_name(&request.target_language);
    let system = translation_system_prompt(target, &request.context);

    tracing::debug!(target = %target, chars = request.text.len(), "translation requested");

    let params = CompletionParams {
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    };

    match state.llm.complete(&system, &request.text, params).await {
        Ok(translation) => Ok(Json(TranslateResponse { translation })),
        Err(e) => {
            tracing::error!(error = %e, "translation failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to translate text".to_string(),
                }),
            ))
        }
    }
}

/// Build the translation router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/translate", post(translate))
        .with_state(state)
}
