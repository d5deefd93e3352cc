//! Genie Gateway - Voice tutoring gateway for children practicing English
//!
//! This library provides the core functionality for the Genie gateway:
//! - Voice recording state machine over cpal devices
//! - Speech service adapters (STT, TTS) with capability negotiation
//! - Tutor conversation orchestration (transcribe, chat, translate, speak)
//! - Stateless chat-completion and translation HTTP endpoints
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      Client                          │
//! │   Recorder  │  STT/TTS adapters  │  Tutor session   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Genie Gateway                        │
//! │   /chat-completion  │  /translate  │  /health       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │         Upstream LLM (OpenAI-compatible)             │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod languages;
pub mod llm;
pub mod prompt;
pub mod speech;
pub mod tutor;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use languages::Language;
pub use llm::LlmClient;
pub use prompt::{Mode, Scenario};
pub use speech::{SpeechToText, TextToSpeech};
pub use tutor::{ChatMessage, HttpTutorBackend, Role, TutorBackend, TutorSession, TutorSettings};
pub use voice::{RecorderState, VoiceRecorder};
