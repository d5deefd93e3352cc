//! Text-to-speech adapter
//!
//! [`SpeakEngine`] implementations synthesize and render one utterance at a
//! time; `halt()` cancels the in-flight utterance immediately and
//! unconditionally, settling the pending `speak` future. Single-utterance
//! discipline is enforced by the orchestration layer, not here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::Config;
use crate::voice::{decode_mp3, play_samples_blocking};
use crate::{Error, Result};

/// Default locale for synthesis
const DEFAULT_LOCALE: &str = "en-US";

/// A cancellable speech synthesis engine
#[async_trait]
pub trait SpeakEngine: Send + Sync {
    /// Speak the text, completing when the utterance finishes or is halted
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or rendering fails
    async fn speak(&self, text: &str, locale: &str) -> Result<()>;

    /// Cancel any in-flight utterance immediately
    fn halt(&self);

    /// Engine name for logging
    fn name(&self) -> &'static str;
}

#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
}

/// Remote synthesis engine against an `OpenAI`-compatible speech API
///
/// Synthesizes MP3 audio upstream and renders it on a blocking task. The
/// voice is fixed by configuration, so the locale only shapes logging.
pub struct RemoteSpeakEngine {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    voice: String,
    speed: f32,
    stop: Arc<AtomicBool>,
}

impl RemoteSpeakEngine {
    #[must_use]
    pub fn new(
        base_url: String,
        api_key: SecretString,
        model: String,
        voice: String,
        speed: f32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
            voice,
            speed,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Tts(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("synthesis error {status}: {body}")));
        }

        let audio = response.bytes().await.map_err(|e| Error::Tts(e.to_string()))?;
        Ok(audio.to_vec())
    }
}

#[async_trait]
impl SpeakEngine for RemoteSpeakEngine {
    async fn speak(&self, text: &str, locale: &str) -> Result<()> {
        self.stop.store(false, Ordering::SeqCst);
        tracing::debug!(chars = text.len(), locale, "synthesizing speech");

        let mp3 = self.synthesize(text).await?;
        if self.stop.load(Ordering::SeqCst) {
            tracing::debug!("utterance halted before playback");
            return Ok(());
        }

        let stop = Arc::clone(&self.stop);
        tokio::task::spawn_blocking(move || {
            let (samples, rate) = decode_mp3(&mp3)?;
            play_samples_blocking(&samples, rate, &stop).map_err(|e| Error::Tts(e.to_string()))
        })
        .await
        .map_err(|e| Error::Tts(e.to_string()))?
    }

    fn halt(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Text-to-speech facade with one-time capability negotiation
///
/// Cheaply cloneable so callers can keep a stop handle while a speak future
/// is pending.
#[derive(Clone)]
pub struct TextToSpeech {
    engine: Option<Arc<dyn SpeakEngine>>,
    locale: Arc<Mutex<String>>,
}

impl TextToSpeech {
    /// Facade over a concrete engine
    #[must_use]
    pub fn new(engine: Arc<dyn SpeakEngine>) -> Self {
        Self {
            engine: Some(engine),
            locale: Arc::new(Mutex::new(DEFAULT_LOCALE.to_string())),
        }
    }

    /// Facade for environments without speech synthesis
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            engine: None,
            locale: Arc::new(Mutex::new(DEFAULT_LOCALE.to_string())),
        }
    }

    /// Negotiate synthesis support from configuration, once at startup
    #[must_use]
    pub fn negotiate(config: &Config) -> Self {
        if !config.voice.enabled {
            return Self::unsupported();
        }

        config.api_keys.groq.clone().map_or_else(
            || {
                tracing::warn!("no API key; speech synthesis unavailable");
                Self::unsupported()
            },
            |key| {
                tracing::info!(
                    model = %config.voice.tts_model,
                    voice = %config.voice.tts_voice,
                    "speech synthesis: remote engine"
                );
                Self::new(Arc::new(RemoteSpeakEngine::new(
                    config.llm.base_url.clone(),
                    key,
                    config.voice.tts_model.clone(),
                    config.voice.tts_voice.clone(),
                    config.voice.tts_speed,
                )))
            },
        )
    }

    /// Whether synthesis is available in this environment
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    /// Configure the synthesis locale for future utterances
    pub fn set_language(&self, locale: &str) {
        if let Ok(mut current) = self.locale.lock() {
            locale.clone_into(&mut current);
        }
    }

    /// Speak the text, completing when the utterance finishes or is stopped
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tts`] if synthesis is unsupported or fails
    pub async fn speak(&self, text: &str) -> Result<()> {
        let Some(engine) = &self.engine else {
            return Err(Error::Tts("speech synthesis not supported".to_string()));
        };
        let locale = self
            .locale
            .lock()
            .map_or_else(|_| DEFAULT_LOCALE.to_string(), |l| l.clone());
        engine.speak(text, &locale).await
    }

    /// Cancel any in-flight utterance immediately
    pub fn stop(&self) {
        if let Some(engine) = &self.engine {
            engine.halt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::Notify;

    /// Engine whose utterances hang until halted
    struct HangingEngine {
        halted: Arc<Notify>,
    }

    #[async_trait]
    impl SpeakEngine for HangingEngine {
        async fn speak(&self, _text: &str, _locale: &str) -> Result<()> {
            self.halted.notified().await;
            Ok(())
        }

        fn halt(&self) {
            self.halted.notify_one();
        }

        fn name(&self) -> &'static str {
            "hanging"
        }
    }

    #[tokio::test]
    async fn unsupported_facade_fails_speak() {
        let tts = TextToSpeech::unsupported();
        assert!(!tts.is_supported());
        assert!(matches!(tts.speak("hi").await, Err(Error::Tts(_))));
    }

    #[tokio::test]
    async fn stop_settles_a_pending_utterance() {
        let tts = TextToSpeech::new(Arc::new(HangingEngine { halted: Arc::new(Notify::new()) }));
        let handle = tts.clone();

        let speak = tokio::spawn(async move { tts.speak("a very long sentence").await });
        tokio::task::yield_now().await;
        handle.stop();

        let result = tokio::time::timeout(std::time::Duration::from_secs(1), speak)
            .await
            .expect("speak future must settle after stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn stop_without_engine_is_harmless() {
        TextToSpeech::unsupported().stop();
    }
}
