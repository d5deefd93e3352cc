//! Gateway endpoint client
//!
//! The tutor session talks to the two gateway endpoints through the
//! [`TutorBackend`] trait so tests can substitute a scripted backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::prompt::{Mode, Scenario};
use crate::{Error, Result};

/// Remote tutor operations used by the session
#[async_trait]
pub trait TutorBackend: Send + Sync {
    /// Get a tutor reply for a transcribed user message
    ///
    /// # Errors
    ///
    /// Returns [`Error::Chat`] on network failure or a non-2xx response;
    /// halts the current turn
    async fn chat(&self, message: &str, mode: Mode, scenario: Option<Scenario>) -> Result<String>;

    /// Translate an assistant reply into the learner's native language
    ///
    /// # Errors
    ///
    /// Returns [`Error::Translation`] on failure; callers recover with the
    /// untranslated text
    async fn translate(&self, text: &str, target_language: &str, context: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<Scenario>,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    #[serde(rename = "targetLanguage")]
    target_language: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// HTTP client for the gateway's chat and translation endpoints
pub struct HttpTutorBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTutorBackend {
    /// Client against a gateway base URL (e.g. `http://127.0.0.1:8787`)
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl TutorBackend for HttpTutorBackend {
    async fn chat(&self, message: &str, mode: Mode, scenario: Option<Scenario>) -> Result<String> {
        let request = ChatRequest { message, mode, scenario };

        let response = self
            .client
            .post(format!("{}/chat-completion", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Chat(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Chat(format!("chat endpoint error {status}: {body}")));
        }

        let result: ChatResponse = response.json().await.map_err(|e| Error::Chat(e.to_string()))?;
        Ok(result.response)
    }

    async fn translate(&self, text: &str, target_language: &str, context: &str) -> Result<String> {
        let request = TranslateRequest { text, target_language, context };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Translation(format!(
                "translate endpoint error {status}: {body}"
            )));
        }

        let result: TranslateResponse =
            response.json().await.map_err(|e| Error::Translation(e.to_string()))?;
        Ok(result.translation)
    }
}
