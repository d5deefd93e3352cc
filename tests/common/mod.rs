//! Shared test utilities
//!
//! Scripted service implementations so pipeline tests run without audio
//! hardware or a network.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use genie_gateway::speech::{SpeakEngine, SpeechToText, SttEngine, TextToSpeech};
use genie_gateway::tutor::{TutorBackend, TutorSession, TutorSettings};
use genie_gateway::voice::AudioSink;
use genie_gateway::{Error, Mode, Result, Scenario};

/// Recorded arguments of a chat call
#[derive(Debug, Clone)]
pub struct ChatCall {
    pub message: String,
    pub mode: Mode,
    pub scenario: Option<Scenario>,
}

/// Recorded arguments of a translate call
#[derive(Debug, Clone)]
pub struct TranslateCall {
    pub text: String,
    pub target_language: String,
    pub context: String,
}

/// Scripted tutor backend recording every call
#[derive(Default)]
pub struct ScriptedBackend {
    pub chat_reply: String,
    pub fail_chat: bool,
    pub translation: String,
    pub fail_translate: bool,
    pub chat_calls: Mutex<Vec<ChatCall>>,
    pub translate_calls: Mutex<Vec<TranslateCall>>,
}

impl ScriptedBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            chat_reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn with_translation(mut self, translation: &str) -> Self {
        self.translation = translation.to_string();
        self
    }

    pub fn failing_chat() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    pub fn failing_translation(mut self) -> Self {
        self.fail_translate = true;
        self
    }

    pub fn chat_call_count(&self) -> usize {
        self.chat_calls.lock().unwrap().len()
    }

    pub fn translate_call_count(&self) -> usize {
        self.translate_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TutorBackend for ScriptedBackend {
    async fn chat(&self, message: &str, mode: Mode, scenario: Option<Scenario>) -> Result<String> {
        self.chat_calls.lock().unwrap().push(ChatCall {
            message: message.to_string(),
            mode,
            scenario,
        });
        if self.fail_chat {
            return Err(Error::Chat("scripted chat failure".to_string()));
        }
        Ok(self.chat_reply.clone())
    }

    async fn translate(&self, text: &str, target_language: &str, context: &str) -> Result<String> {
        self.translate_calls.lock().unwrap().push(TranslateCall {
            text: text.to_string(),
            target_language: target_language.to_string(),
            context: context.to_string(),
        });
        if self.fail_translate {
            return Err(Error::Translation("scripted translation failure".to_string()));
        }
        Ok(self.translation.clone())
    }
}

/// STT engine returning a fixed transcript, or failing
pub struct FixedStt {
    pub transcript: Option<String>,
    pub calls: AtomicUsize,
}

impl FixedStt {
    pub fn transcribing(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            transcript: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SttEngine for FixedStt {
    async fn transcribe(&self, _audio: &[u8], _locale: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcript
            .clone()
            .ok_or_else(|| Error::Stt("scripted transcription failure".to_string()))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Speak engine that completes instantly, recording utterances
#[derive(Default)]
pub struct RecordingSpeak {
    pub utterances: Mutex<Vec<String>>,
}

impl RecordingSpeak {
    pub fn utterance_count(&self) -> usize {
        self.utterances.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeakEngine for RecordingSpeak {
    async fn speak(&self, text: &str, _locale: &str) -> Result<()> {
        self.utterances.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn halt(&self) {}

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Speak engine whose utterances hang until halted
pub struct HangingSpeak {
    halted: tokio::sync::Notify,
}

impl HangingSpeak {
    pub const fn new() -> Self {
        Self {
            halted: tokio::sync::Notify::const_new(),
        }
    }
}

impl Default for HangingSpeak {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeakEngine for HangingSpeak {
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

/// Sink counting artifact replays
#[derive(Default)]
pub struct CountingSink {
    pub plays: AtomicUsize,
}

#[async_trait]
impl AudioSink for CountingSink {
    async fn play_wav(&self, _wav: Arc<Vec<u8>>) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Session wired to scripted services
pub fn build_session(
    backend: Arc<ScriptedBackend>,
    stt: Arc<FixedStt>,
    speak: Arc<dyn SpeakEngine>,
) -> TutorSession {
    TutorSession::new(
        backend,
        SpeechToText::new(stt),
        TextToSpeech::new(speak),
        TutorSettings::default(),
    )
}

/// A small but valid artifact for pipeline turns
pub fn artifact() -> Vec<u8> {
    genie_gateway::voice::samples_to_wav(&[0.1_f32; 160], genie_gateway::voice::SAMPLE_RATE)
        .expect("wav encoding")
}
