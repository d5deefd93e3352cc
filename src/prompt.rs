//! System instruction builders for the tutor and translation endpoints

use serde::{Deserialize, Serialize};

/// Conversation mode for a practice session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Open-ended conversation
    #[default]
    Freeflow,
    /// Guided roleplay within a fixed scenario
    Roleplay,
}

/// Fixed roleplay scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    School,
    Store,
    Home,
}

impl Scenario {
    /// Stable identifier used in request bodies and context strings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Store => "store",
            Self::Home => "home",
        }
    }

    /// Roleplay context appended to the tutor instruction
    const fn template(self) -> &'static str {
        match self {
            Self::School => {
                "You're helping practice school conversations. Act as a teacher, classmate, or school staff member. Focus on classroom interactions, asking questions, and school-related topics."
            }
            Self::Store => {
                "You're helping practice store/shopping conversations. Act as a store clerk or helpful customer. Focus on asking for help, making purchases, and polite interactions."
            }
            Self::Home => {
                "You're helping practice home conversations. Act as a family member or friend. Focus on casual conversations, daily activities, and family interactions."
            }
        }
    }
}

/// Base instruction for the child-tutor persona
const TUTOR_BASE: &str = "You are SpeakGenie, a friendly AI tutor helping children learn English through conversation.

Key guidelines:
- Use simple, clear language appropriate for children
- Be encouraging and positive
- Ask follow-up questions to keep the conversation going
- Correct mistakes gently by repeating the correct form naturally
- Keep responses conversational and engaging
- Limit responses to 2-3 sentences to maintain attention";

/// Build the tutor system instruction for a chat completion
///
/// Roleplay mode appends the scenario template; freeflow (or roleplay with no
/// scenario) uses the base instruction alone.
#[must_use]
pub fn tutor_system_prompt(mode: Mode, scenario: Option<Scenario>) -> String {
    match (mode, scenario) {
        (Mode::Roleplay, Some(s)) => {
            format!("{TUTOR_BASE}\n\nRoleplay Context: {}", s.template())
        }
        _ => TUTOR_BASE.to_string(),
    }
}

/// Build the translation system instruction
///
/// `target_language` is a display name (e.g. "Spanish"), not a code.
#[must_use]
pub fn translation_system_prompt(target_language: &str, context: &str) -> String {
    let context = if context.is_empty() {
        "general conversation"
    } else {
        context
    };

    format!(
        "You are a helpful translation assistant for children learning English.

Translate the given English text to {target_language} in a way that's appropriate for children.

Guidelines:
- Use simple, clear language
- Keep the friendly, encouraging tone
- If it's an educational explanation, make it easy to understand
- Maintain the context: {context}

Only return the translation, nothing else."
    )
}

/// Free-text context passed to the translation endpoint for a session
#[must_use]
pub fn translation_context(mode: Mode, scenario: Option<Scenario>) -> String {
    match (mode, scenario) {
        (Mode::Roleplay, Some(s)) => format!("roleplay scenario: {}", s.as_str()),
        (Mode::Roleplay, None) => "roleplay scenario".to_string(),
        (Mode::Freeflow, _) => "free conversation".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeflow_uses_base_instruction_only() {
        let prompt = tutor_system_prompt(Mode::Freeflow, None);
        assert!(prompt.contains("SpeakGenie"));
        assert!(!prompt.contains("Roleplay Context"));
    }

    #[test]
    fn roleplay_store_picks_store_template() {
        let prompt = tutor_system_prompt(Mode::Roleplay, Some(Scenario::Store));
        assert!(prompt.contains("Roleplay Context"));
        assert!(prompt.contains("store clerk"));
        assert!(!prompt.contains("classmate"));
        assert!(!prompt.contains("family member"));
    }

    #[test]
    fn roleplay_without_scenario_falls_back_to_base() {
        let prompt = tutor_system_prompt(Mode::Roleplay, None);
        assert!(!prompt.contains("Roleplay Context"));
    }

    #[test]
    fn scenario_is_ignored_in_freeflow() {
        let prompt = tutor_system_prompt(Mode::Freeflow, Some(Scenario::School));
        assert!(!prompt.contains("classmate"));
    }

    #[test]
    fn translation_prompt_names_target_language() {
        let prompt = translation_system_prompt("Spanish", "free conversation");
        assert!(prompt.contains("to Spanish"));
        assert!(prompt.contains("Maintain the context: free conversation"));
    }

    #[test]
    fn translation_prompt_defaults_empty_context() {
        let prompt = translation_system_prompt("French", "");
        assert!(prompt.contains("Maintain the context: general conversation"));
    }

    #[test]
    fn context_reflects_mode_and_scenario() {
        assert_eq!(
            translation_context(Mode::Roleplay, Some(Scenario::Store)),
            "roleplay scenario: store"
        );
        assert_eq!(translation_context(Mode::Freeflow, None), "free conversation");
        assert_eq!(
            translation_context(Mode::Freeflow, Some(Scenario::Home)),
            "free conversation"
        );
    }

    #[test]
    fn modes_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Roleplay).unwrap(), "\"roleplay\"");
        assert_eq!(serde_json::to_string(&Scenario::Store).unwrap(), "\"store\"");
    }
}
