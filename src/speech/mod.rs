//! Speech service adapters
//!
//! Capability-polymorphic facades over speech-to-text and text-to-speech.
//! Support is negotiated once at construction (from configuration and the
//! available credentials) and queried via `is_supported()`; callers check
//! before invoking.

mod stt;
mod tts;

pub use stt::{MockSttEngine, SpeechToText, SttEngine, WhisperSttEngine};
pub use tts::{RemoteSpeakEngine, SpeakEngine, TextToSpeech};
