//! Configuration management for the Genie gateway
//!
//! Defaults, overlaid by `~/.config/genie/config.toml` when present, then by
//! environment variables. The upstream API key is read once at load; its
//! absence is not an error — upstream calls simply fail.

pub mod file;

use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;

use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::Result;

use file::GenieConfigFile;

/// Default API server port
pub const DEFAULT_PORT: u16 = 8787;

/// Speech recognition engine selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SttEngineKind {
    /// Canned transcripts, no real recognition
    #[default]
    Mock,
    /// Remote Whisper transcription
    Whisper,
}

/// Genie gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream LLM settings
    pub llm: LlmConfig,

    /// Voice processing settings
    pub voice: VoiceConfig,

    /// HTTP API server settings
    pub server: ServerConfig,

    /// Tutor session defaults
    pub tutor: TutorConfig,

    /// API keys for external services
    pub api_keys: ApiKeys,
}

/// Upstream LLM settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `OpenAI`-compatible API base URL
    pub base_url: String,

    /// Chat model identifier
    pub model: String,
}

/// Voice processing settings
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable voice input/output
    pub enabled: bool,

    /// Speech recognition engine
    pub stt_engine: SttEngineKind,

    /// STT model for the whisper engine
    pub stt_model: String,

    /// TTS model
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier
    pub tts_speed: f32,
}

/// HTTP API server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Tutor session defaults
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// Default learner native language code
    pub native_language: String,

    /// Enable native-language help by default
    pub native_help: bool,
}

/// API keys for external services
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// Upstream LLM provider key (`GROQ_API_KEY`)
    pub groq: Option<SecretString>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("groq", &self.groq.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Config {
    /// Load configuration from defaults, the config file, and environment
    ///
    /// # Errors
    ///
    /// Returns error if an existing config file cannot be read or parsed
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration, optionally forcing voice off
    ///
    /// # Errors
    ///
    /// Returns error if an existing config file cannot be read or parsed
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let overlay = Self::read_config_file()?;
        Ok(Self::resolve(&overlay, disable_voice))
    }

    /// Resolve a full config from a (possibly empty) file overlay plus env
    #[must_use]
    pub fn resolve(overlay: &GenieConfigFile, disable_voice: bool) -> Self {
        let groq = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(SecretString::from);

        let port = std::env::var("GENIE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .or(overlay.server.port)
            .unwrap_or(DEFAULT_PORT);

        let enabled = if disable_voice {
            false
        } else {
            overlay.voice.enabled.unwrap_or(true)
        };

        Self {
            llm: LlmConfig {
                base_url: std::env::var("GENIE_LLM_BASE_URL")
                    .ok()
                    .or_else(|| overlay.llm.base_url.clone())
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: overlay
                    .llm
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
            voice: VoiceConfig {
                enabled,
                stt_engine: overlay.voice.stt_engine.unwrap_or_default(),
                stt_model: overlay
                    .voice
                    .stt_model
                    .clone()
                    .unwrap_or_else(|| "whisper-large-v3".to_string()),
                tts_model: overlay
                    .voice
                    .tts_model
                    .clone()
                    .unwrap_or_else(|| "playai-tts".to_string()),
                tts_voice: overlay
                    .voice
                    .tts_voice
                    .clone()
                    .unwrap_or_else(|| "Fritz-PlayAI".to_string()),
                tts_speed: overlay.voice.tts_speed.unwrap_or(1.0),
            },
            server: ServerConfig { port },
            tutor: TutorConfig {
                native_language: overlay
                    .tutor
                    .native_language
                    .clone()
                    .unwrap_or_else(|| "en".to_string()),
                native_help: overlay.tutor.native_help.unwrap_or(false),
            },
            api_keys: ApiKeys { groq },
        }
    }

    /// Path to the user config file, if a home directory exists
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("genie").join("config.toml"))
    }

    fn read_config_file() -> Result<GenieConfigFile> {
        let Some(path) = Self::config_path() else {
            return Ok(GenieConfigFile::default());
        };
        if !path.exists() {
            return Ok(GenieConfigFile::default());
        }

        tracing::debug!(path = %path.display(), "loading config file");
        let content = std::fs::read_to_string(&path)?;
        GenieConfigFile::parse(&content)
    }
}
