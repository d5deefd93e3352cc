//! TOML configuration file loading
//!
//! Supports `~/.config/genie/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of
//! defaults.

use serde::Deserialize;

use crate::config::SttEngineKind;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct GenieConfigFile {
    /// Upstream LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Tutor session defaults
    #[serde(default)]
    pub tutor: TutorFileConfig,
}

/// Upstream LLM configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// `OpenAI`-compatible API base URL
    pub base_url: Option<String>,

    /// Chat model identifier (e.g. "llama-3.1-8b-instant")
    pub model: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,

    /// Speech recognition engine ("mock" or "whisper")
    pub stt_engine: Option<SttEngineKind>,

    /// STT model (e.g. "whisper-large-v3")
    pub stt_model: Option<String>,

    /// TTS model (e.g. "playai-tts")
    pub tts_model: Option<String>,

    /// TTS voice identifier
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,
}

/// Tutor session defaults
#[derive(Debug, Default, Deserialize)]
pub struct TutorFileConfig {
    /// Default learner native language code (e.g. "es")
    pub native_language: Option<String>,

    /// Enable native-language help by default
    pub native_help: Option<bool>,
}

impl GenieConfigFile {
    /// Parse a TOML config file
    ///
    /// # Errors
    ///
    /// Returns error on malformed TOML
    pub fn parse(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_parses_to_defaults() {
        let config = GenieConfigFile::parse("").unwrap();
        assert!(config.llm.model.is_none());
        assert!(config.voice.enabled.is_none());
        assert!(config.server.port.is_none());
    }

    #[test]
    fn partial_overlay_parses() {
        let config = GenieConfigFile::parse(
            r#"
[voice]
enabled = true
stt_engine = "whisper"

[tutor]
native_language = "es"
native_help = true
"#,
        )
        .unwrap();

        assert_eq!(config.voice.enabled, Some(true));
        assert_eq!(config.voice.stt_engine, Some(SttEngineKind::Whisper));
        assert_eq!(config.tutor.native_language.as_deref(), Some("es"));
        assert_eq!(config.tutor.native_help, Some(true));
        assert!(config.llm.base_url.is_none());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GenieConfigFile::parse("voice = [").is_err());
    }
}
