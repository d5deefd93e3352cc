//! Speech-to-text adapter
//!
//! One-shot request/response transcription behind the [`SttEngine`]
//! capability trait. The mock engine stands in for a real recognizer during
//! development; the Whisper engine is the production implementation. Both
//! honor the same contract: one audio artifact in, one transcript out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{Config, SttEngineKind};
use crate::{Error, Result};

/// Default locale for speech recognition
const DEFAULT_LOCALE: &str = "en-US";

/// Simulated recognition delay for the mock engine
const MOCK_DELAY: Duration = Duration::from_secs(1);

/// Canned transcripts returned by the mock engine
const MOCK_TRANSCRIPTS: [&str; 8] = [
    "Hello, I want to practice speaking English!",
    "Can you help me with my pronunciation?",
    "I'm learning new words today.",
    "How do you say this in English?",
    "Thank you for helping me learn!",
    "I enjoy practicing conversations.",
    "What should we talk about next?",
    "This is fun and educational!",
];

/// A one-shot transcription engine
#[async_trait]
pub trait SttEngine: Send + Sync {
    /// Transcribe a finalized audio artifact
    ///
    /// # Errors
    ///
    /// Returns error if recognition fails
    async fn transcribe(&self, audio: &[u8], locale: &str) -> Result<String>;

    /// Engine name for logging
    fn name(&self) -> &'static str;
}

/// Mock engine returning canned transcripts after a simulated delay
pub struct MockSttEngine {
    delay: Duration,
}

impl MockSttEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self { delay: MOCK_DELAY }
    }

    /// Mock without the simulated delay, for tests
    #[must_use]
    pub const fn instant() -> Self {
        Self { delay: Duration::ZERO }
    }
}

impl Default for MockSttEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SttEngine for MockSttEngine {
    async fn transcribe(&self, _audio: &[u8], _locale: &str) -> Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let transcript = MOCK_TRANSCRIPTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(MOCK_TRANSCRIPTS[0]);
        Ok(transcript.to_string())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Response from the Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Whisper engine against an `OpenAI`-compatible transcription API
pub struct WhisperSttEngine {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl WhisperSttEngine {
    #[must_use]
    pub fn new(base_url: String, api_key: SecretString, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl SttEngine for WhisperSttEngine {
    async fn transcribe(&self, audio: &[u8], locale: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), locale, "starting transcription");

        // Whisper takes a bare language subtag, not a full locale
        let language = locale.split('-').next().unwrap_or(locale).to_string();

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", language);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                Error::Stt(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Stt(format!("transcription error {status}: {body}")));
        }

        let result: WhisperResponse = response
            .json()
            .await
            .map_err(|e| Error::Stt(e.to_string()))?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}

/// Speech-to-text facade with one-time capability negotiation
///
/// Cheaply cloneable; clones share the engine and recognition locale.
#[derive(Clone)]
pub struct SpeechToText {
    engine: Option<Arc<dyn SttEngine>>,
    locale: Arc<Mutex<String>>,
}

impl SpeechToText {
    /// Facade over a concrete engine
    #[must_use]
    pub fn new(engine: Arc<dyn SttEngine>) -> Self {
        Self {
            engine: Some(engine),
            locale: Arc::new(Mutex::new(DEFAULT_LOCALE.to_string())),
        }
    }

    /// Facade for environments without speech recognition
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            engine: None,
            locale: Arc::new(Mutex::new(DEFAULT_LOCALE.to_string())),
        }
    }

    /// Negotiate recognition support from configuration, once at startup
    #[must_use]
    pub fn negotiate(config: &Config) -> Self {
        if !config.voice.enabled {
            return Self::unsupported();
        }

        match config.voice.stt_engine {
            SttEngineKind::Mock => {
                tracing::info!("speech recognition: mock engine");
                Self::new(Arc::new(MockSttEngine::new()))
            }
            SttEngineKind::Whisper => config.api_keys.groq.clone().map_or_else(
                || {
                    tracing::warn!("whisper engine selected but no API key; speech recognition unavailable");
                    Self::unsupported()
                },
                |key| {
                    tracing::info!(model = %config.voice.stt_model, "speech recognition: whisper engine");
                    Self::new(Arc::new(WhisperSttEngine::new(
                        config.llm.base_url.clone(),
                        key,
                        config.voice.stt_model.clone(),
                    )))
                },
            ),
        }
    }

    /// Whether recognition is available in this environment
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    /// Configure the recognition locale for future calls
    pub fn set_language(&self, locale: &str) {
        if let Ok(mut current) = self.locale.lock() {
            locale.clone_into(&mut current);
        }
    }

    /// The configured recognition locale
    #[must_use]
    pub fn language(&self) -> String {
        self.locale
            .lock()
            .map_or_else(|_| DEFAULT_LOCALE.to_string(), |l| l.clone())
    }

    /// Transcribe a finalized audio artifact
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stt`] if recognition is unsupported or fails
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let Some(engine) = &self.engine else {
            return Err(Error::Stt("speech recognition not supported".to_string()));
        };
        let locale = self.language();
        tracing::debug!(engine = engine.name(), locale = %locale, "transcribing");
        engine.transcribe(audio, &locale).await
    }
}
