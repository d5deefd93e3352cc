//! Conversation messages

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Assistant greeting seeded into every new session
pub const WELCOME_MESSAGE: &str = "Hi there! I'm SpeakGenie, your AI speaking buddy! You can talk to me by recording your voice, and I'll listen and respond. What would you like to chat about today?";

/// Fixed reply appended when a turn fails
pub const FALLBACK_REPLY: &str = "Sorry, I had trouble understanding that. Could you try speaking again?";

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation history
///
/// Immutable once appended; the history itself is append-only.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Unique id within the session
    pub id: String,
    pub role: Role,
    pub text: String,
    /// Native-language rendering of an assistant reply, when native help
    /// produced one
    pub translation: Option<String>,
    /// The recorded artifact behind a user message, for replay
    pub audio: Option<Arc<Vec<u8>>>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A user message carrying its source recording
    #[must_use]
    pub fn user(text: String, audio: Arc<Vec<u8>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            text,
            translation: None,
            audio: Some(audio),
            timestamp: Utc::now(),
        }
    }

    /// An assistant message, optionally with a native-language translation
    #[must_use]
    pub fn assistant(text: String, translation: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            text,
            translation,
            audio: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_unique() {
        let a = ChatMessage::assistant("one".to_string(), None);
        let b = ChatMessage::assistant("two".to_string(), None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn user_messages_carry_their_audio() {
        let audio = Arc::new(vec![1u8, 2, 3]);
        let msg = ChatMessage::user("hello".to_string(), Arc::clone(&audio));
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.audio.as_deref(), Some(&vec![1u8, 2, 3]));
        assert!(msg.translation.is_none());
    }
}
