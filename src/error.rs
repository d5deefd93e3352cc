//! Error types for the Genie gateway

use thiserror::Error;

/// Result type alias for Genie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Genie gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Microphone access denied or unavailable
    #[error("microphone permission error: {0}")]
    Permission(String),

    /// Audio device or stream error
    #[error("audio error: {0}")]
    Audio(String),

    /// Recorded-artifact playback error
    #[error("playback error: {0}")]
    Playback(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Chat endpoint failure (network or non-2xx); halts the current turn
    #[error("chat error: {0}")]
    Chat(String),

    /// Translation endpoint failure; callers fall back to the untranslated text
    #[error("translation error: {0}")]
    Translation(String),

    /// Upstream LLM provider failure
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A conversation turn is already in flight
    #[error("busy: {0}")]
    Busy(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
