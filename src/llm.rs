//! Upstream LLM client
//!
//! Thin client for an `OpenAI`-compatible chat-completions API (Groq by
//! default). One request per call, no retry, no timeout: a failed or hung
//! upstream surfaces directly to the caller.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default upstream API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatTurn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Sampling parameters for a completion call
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Client for the upstream chat-completions API
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
}

impl LlmClient {
    /// Create a new client
    ///
    /// A missing API key is not an error here — the upstream rejects the
    /// request instead, matching the single-attempt failure policy.
    #[must_use]
    pub fn new(base_url: String, api_key: Option<SecretString>, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    /// The configured model identifier
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one chat completion with a system instruction and a user message
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on network failure, a non-2xx status, or
    /// an empty completion.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        params: CompletionParams,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatTurn { role: "system", content: system },
                ChatTurn { role: "user", content: user },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, "upstream request failed");
            Error::Upstream(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "upstream API error");
            return Err(Error::Upstream(format!("upstream error {status}: {body}")));
        }

        let result: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse upstream response");
            Error::Upstream(e.to_string())
        })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Upstream("empty completion".to_string()))
    }
}
