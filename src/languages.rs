//! Supported learner languages
//!
//! Static registry of the native languages a learner can pick for
//! translations and speech recognition. Loaded once, never mutated.

/// A supported learner language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO-639-1-like code (e.g. "es")
    pub code: &'static str,
    /// English display name
    pub name: &'static str,
    /// Display name in the language itself
    pub native_name: &'static str,
    /// Locale code for speech recognition (e.g. "es-ES")
    pub speech_code: &'static str,
    /// Flag glyph for UI display
    pub flag: &'static str,
}

/// All supported languages, English first
pub const SUPPORTED_LANGUAGES: [Language; 10] = [
    Language { code: "en", name: "English", native_name: "English", speech_code: "en-US", flag: "\u{1f1fa}\u{1f1f8}" },
    Language { code: "es", name: "Spanish", native_name: "Español", speech_code: "es-ES", flag: "\u{1f1ea}\u{1f1f8}" },
    Language { code: "fr", name: "French", native_name: "Français", speech_code: "fr-FR", flag: "\u{1f1eb}\u{1f1f7}" },
    Language { code: "de", name: "German", native_name: "Deutsch", speech_code: "de-DE", flag: "\u{1f1e9}\u{1f1ea}" },
    Language { code: "it", name: "Italian", native_name: "Italiano", speech_code: "it-IT", flag: "\u{1f1ee}\u{1f1f9}" },
    Language { code: "pt", name: "Portuguese", native_name: "Português", speech_code: "pt-BR", flag: "\u{1f1e7}\u{1f1f7}" },
    Language { code: "zh", name: "Chinese", native_name: "中文", speech_code: "zh-CN", flag: "\u{1f1e8}\u{1f1f3}" },
    Language { code: "ja", name: "Japanese", native_name: "日本語", speech_code: "ja-JP", flag: "\u{1f1ef}\u{1f1f5}" },
    Language { code: "ko", name: "Korean", native_name: "한국어", speech_code: "ko-KR", flag: "\u{1f1f0}\u{1f1f7}" },
    Language { code: "hi", name: "Hindi", native_name: "हिन्दी", speech_code: "hi-IN", flag: "\u{1f1ee}\u{1f1f3}" },
];

/// Look up a language by its code
#[must_use]
pub fn by_code(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES.iter().find(|lang| lang.code == code)
}

/// Look up a language by code, defaulting to English for unknown codes
#[must_use]
pub fn by_code_or_english(code: &str) -> &'static Language {
    by_code(code).unwrap_or_else(english)
}

/// The English entry
#[must_use]
pub fn english() -> &'static Language {
    &SUPPORTED_LANGUAGES[0]
}

/// Display name for a translation target code
///
/// Unknown codes get a generic label rather than an error.
#[must_use]
pub fn display_name(code: &str) -> &'static str {
    by_code(code).map_or("the target language", |lang| lang.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_resolves() {
        for lang in &SUPPORTED_LANGUAGES {
            let found = by_code(lang.code).expect("registered code must resolve");
            assert_eq!(found.name, lang.name);
        }
    }

    #[test]
    fn unknown_code_is_not_found() {
        assert!(by_code("xx").is_none());
        assert!(by_code("").is_none());
    }

    #[test]
    fn unknown_code_defaults_to_english() {
        assert_eq!(by_code_or_english("xx").code, "en");
        assert_eq!(by_code_or_english("es").code, "es");
    }

    #[test]
    fn english_is_first_entry() {
        assert_eq!(english().code, "en");
        assert_eq!(english().speech_code, "en-US");
    }

    #[test]
    fn display_name_falls_back_for_unknown() {
        assert_eq!(display_name("es"), "Spanish");
        assert_eq!(display_name("hi"), "Hindi");
        assert_eq!(display_name("xx"), "the target language");
    }
}
