//! Tutor session orchestration
//!
//! One turn runs strictly in order: transcribe, append the user message,
//! chat completion, optional translation, append the assistant message,
//! then speech playback. The processing flag covers everything up to the
//! assistant append and is cleared on every exit path; the speaking flag
//! brackets playback only and can be cleared externally at any time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::languages::Language;
use crate::prompt::{translation_context, Mode, Scenario};
use crate::speech::{SpeechToText, TextToSpeech};
use crate::voice::AudioSink;
use crate::{Error, Result};

use super::backend::TutorBackend;
use super::message::{ChatMessage, Role, FALLBACK_REPLY, WELCOME_MESSAGE};

/// Synthesis locale for assistant replies; practice is always in English
/// regardless of the learner's native language
const PRACTICE_LOCALE: &str = "en-US";

/// Per-session configuration, read on each pipeline run
#[derive(Debug, Clone)]
pub struct TutorSettings {
    pub mode: Mode,
    pub scenario: Option<Scenario>,
    /// Learner's native language code
    pub native_language: String,
    /// Whether assistant replies get a native-language translation
    pub native_help: bool,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Freeflow,
            scenario: None,
            native_language: "en".to_string(),
            native_help: false,
        }
    }
}

/// Clears a flag when dropped, so the flag cannot outlive its scope even if
/// the owning future is cancelled
struct FlagGuard(Arc<AtomicBool>);

impl FlagGuard {
    fn raise(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A practice conversation with the tutor
pub struct TutorSession {
    backend: Arc<dyn TutorBackend>,
    stt: SpeechToText,
    tts: TextToSpeech,
    sink: Option<Arc<dyn AudioSink>>,
    settings: TutorSettings,
    messages: Vec<ChatMessage>,
    processing: Arc<AtomicBool>,
    speaking: Arc<AtomicBool>,
}

impl TutorSession {
    /// Create a session over injected services, seeded with the greeting
    #[must_use]
    pub fn new(
        backend: Arc<dyn TutorBackend>,
        stt: SpeechToText,
        tts: TextToSpeech,
        settings: TutorSettings,
    ) -> Self {
        Self {
            backend,
            stt,
            tts,
            sink: None,
            settings,
            messages: vec![ChatMessage::assistant(WELCOME_MESSAGE.to_string(), None)],
            processing: Arc::new(AtomicBool::new(false)),
            speaking: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a playback sink for replaying user recordings
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn AudioSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Conversation history, oldest first
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a turn is currently in flight
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Whether an assistant reply is currently being spoken
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Current session settings
    #[must_use]
    pub const fn settings(&self) -> &TutorSettings {
        &self.settings
    }

    /// A handle for cancelling speech from outside the session
    #[must_use]
    pub fn speech_handle(&self) -> TextToSpeech {
        self.tts.clone()
    }

    /// Switch conversation mode and scenario for subsequent turns
    pub fn configure(&mut self, mode: Mode, scenario: Option<Scenario>) {
        self.settings.mode = mode;
        self.settings.scenario = scenario;
    }

    /// Update the learner's native language and help preference
    ///
    /// Re-points the recognition locale; affects subsequent turns only.
    pub fn update_settings(&mut self, language: &Language, native_help: bool) {
        self.stt.set_language(language.speech_code);
        self.settings.native_language = language.code.to_string();
        self.settings.native_help = native_help;
    }

    /// Run one full turn from a finalized recording artifact
    ///
    /// A halting failure (transcription or chat) appends the fixed fallback
    /// reply and completes normally; the message list is never left in a
    /// partial state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a turn is already in flight; the new turn
    /// is rejected, not queued.
    pub async fn send_audio(&mut self, artifact: Vec<u8>) -> Result<()> {
        if self.is_processing() {
            return Err(Error::Busy("a turn is already being processed".to_string()));
        }

        let reply = {
            let _processing = FlagGuard::raise(&self.processing);
            match self.run_turn(Arc::new(artifact)).await {
                Ok(reply) => Some(reply),
                Err(e) => {
                    tracing::error!(error = %e, "turn failed");
                    self.messages
                        .push(ChatMessage::assistant(FALLBACK_REPLY.to_string(), None));
                    None
                }
            }
        };

        if let Some(reply) = reply {
            self.speak(&reply).await;
        }

        Ok(())
    }

    /// Replay an existing message by id
    ///
    /// Assistant messages are re-spoken through TTS; user messages play
    /// their stored recording directly, without re-transcription. Unknown
    /// ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if a user recording cannot be decoded or played
    pub async fn speak_message(&mut self, id: &str) -> Result<()> {
        let Some(message) = self.messages.iter().find(|m| m.id == id).cloned() else {
            return Ok(());
        };

        match message.role {
            Role::Assistant => {
                self.speak(&message.text).await;
                Ok(())
            }
            Role::User => {
                let (Some(sink), Some(audio)) = (&self.sink, &message.audio) else {
                    return Ok(());
                };
                sink.play_wav(Arc::clone(audio)).await
            }
        }
    }

    /// Cancel any in-flight speech immediately
    pub fn stop_speaking(&self) {
        self.tts.stop();
        self.speaking.store(false, Ordering::SeqCst);
    }

    /// Steps 1-5: transcribe through assistant append
    async fn run_turn(&mut self, artifact: Arc<Vec<u8>>) -> Result<String> {
        let transcript = self.stt.transcribe(&artifact).await?;
        tracing::info!(transcript = %transcript, "user turn transcribed");

        self.messages
            .push(ChatMessage::user(transcript.clone(), artifact));

        let reply = self
            .backend
            .chat(&transcript, self.settings.mode, self.settings.scenario)
            .await?;

        let translation = if self.needs_translation() {
            Some(self.translate_or_original(&reply).await)
        } else {
            None
        };

        self.messages
            .push(ChatMessage::assistant(reply.clone(), translation));

        Ok(reply)
    }

    /// Translation applies only with native help on and a non-English
    /// native language
    fn needs_translation(&self) -> bool {
        self.settings.native_help && self.settings.native_language != "en"
    }

    /// Translate a reply, falling back to the original text on failure
    async fn translate_or_original(&self, reply: &str) -> String {
        let context = translation_context(self.settings.mode, self.settings.scenario);
        match self
            .backend
            .translate(reply, &self.settings.native_language, &context)
            .await
        {
            Ok(translation) => translation,
            Err(e) => {
                tracing::warn!(error = %e, "translation failed, keeping original text");
                reply.to_string()
            }
        }
    }

    /// Step 6: speak a reply in English, logging failures
    async fn speak(&self, text: &str) {
        if !self.tts.is_supported() {
            return;
        }

        let _speaking = FlagGuard::raise(&self.speaking);
        self.tts.set_language(PRACTICE_LOCALE);
        if let Err(e) = self.tts.speak(text).await {
            tracing::warn!(error = %e, "text-to-speech error");
        }
    }
}
